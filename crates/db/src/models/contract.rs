//! Contract row model and domain conversions.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use clientele_core::contract::{
    ArchivedContract, BillingFrequency, Contract, ContractRecord, ServiceType,
};
use clientele_core::error::CoreError;
use clientele_core::types::{DbId, Timestamp};

/// A row from the `contracts` table.
///
/// `archived_at IS NULL` marks the active state; archived rows carry the
/// archive metadata alongside the contract snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContractRow {
    pub id: DbId,
    pub last_name: String,
    pub first_name: String,
    pub company: Option<String>,
    /// Storage identifiers; see [`ServiceType::as_str`].
    pub service_types: Vec<String>,
    pub amount: f64,
    pub billing_frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub archived_at: Option<Timestamp>,
    pub archive_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContractRow {
    /// Convert the row into its lifecycle state.
    ///
    /// Fails with [`CoreError::Internal`] when the row carries identifiers
    /// the domain does not know (schema drift).
    pub fn into_record(self) -> Result<ContractRecord, CoreError> {
        let archived_at = self.archived_at;
        // Archived rows written before the comment was required convert
        // with an empty comment rather than failing.
        let archive_comment = self.archive_comment.clone().unwrap_or_default();
        let contract = self.into_contract()?;

        Ok(match archived_at {
            None => ContractRecord::Active(contract),
            Some(archived_at) => ContractRecord::Archived(ArchivedContract {
                contract,
                archived_at,
                archive_comment,
            }),
        })
    }

    /// Convert a row fetched from an active-set query.
    pub fn into_active(self) -> Result<Contract, CoreError> {
        match self.into_record()? {
            ContractRecord::Active(contract) => Ok(contract),
            ContractRecord::Archived(entry) => Err(CoreError::Internal(format!(
                "contract {} is archived but was read as active",
                entry.contract.id
            ))),
        }
    }

    /// Convert a row fetched from an archive query.
    pub fn into_archived(self) -> Result<ArchivedContract, CoreError> {
        match self.into_record()? {
            ContractRecord::Archived(entry) => Ok(entry),
            ContractRecord::Active(contract) => Err(CoreError::Internal(format!(
                "contract {} is active but was read as archived",
                contract.id
            ))),
        }
    }

    /// Build the embedded contract snapshot, parsing stored identifiers.
    fn into_contract(self) -> Result<Contract, CoreError> {
        let service_types = parse_service_types(&self.service_types)?;
        let billing_frequency =
            BillingFrequency::parse(&self.billing_frequency).ok_or_else(|| {
                CoreError::Internal(format!(
                    "unknown billing frequency in database: {}",
                    self.billing_frequency
                ))
            })?;

        Ok(Contract {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            company: self.company,
            service_types,
            amount: self.amount,
            billing_frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            comment: self.comment,
        })
    }
}

/// Parse stored service-type identifiers, preserving order.
fn parse_service_types(raw: &[String]) -> Result<Vec<ServiceType>, CoreError> {
    raw.iter()
        .map(|value| {
            ServiceType::parse(value).ok_or_else(|| {
                CoreError::Internal(format!("unknown service type in database: {value}"))
            })
        })
        .collect()
}

/// Storage identifiers for a service-type list, for query binding.
pub fn service_type_identifiers(service_types: &[ServiceType]) -> Vec<String> {
    service_types.iter().map(|t| t.as_str().to_string()).collect()
}
