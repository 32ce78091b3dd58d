//! Service contract data model and lifecycle.
//!
//! A contract is always in exactly one of two states: active, or archived
//! with an archival timestamp and comment. [`ContractRecord`] is the
//! tagged-variant view of that lifecycle; the persistence layer guarantees
//! a contract is never visible in both states at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Archive comment written by the expiry sweep.
pub const AUTO_ARCHIVE_COMMENT: &str = "Archived automatically - contract expired";

// ---------------------------------------------------------------------------
// Service types
// ---------------------------------------------------------------------------

/// Service categories a contract can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Seo,
    WebDevelopment,
    WebDevelopmentMaintenance,
    WebsiteMaintenance,
    WebsiteCreation,
}

impl ServiceType {
    /// Every service category, in catalogue order (for presentation pickers).
    pub const ALL: [ServiceType; 5] = [
        ServiceType::Seo,
        ServiceType::WebDevelopment,
        ServiceType::WebDevelopmentMaintenance,
        ServiceType::WebsiteMaintenance,
        ServiceType::WebsiteCreation,
    ];

    /// Stable storage identifier (matches the serde snake_case form).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seo => "seo",
            Self::WebDevelopment => "web_development",
            Self::WebDevelopmentMaintenance => "web_development_maintenance",
            Self::WebsiteMaintenance => "website_maintenance",
            Self::WebsiteCreation => "website_creation",
        }
    }

    /// Parse a storage identifier back into a service type.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Seo => "SEO",
            Self::WebDevelopment => "Web Development",
            Self::WebDevelopmentMaintenance => "Web Development Maintenance",
            Self::WebsiteMaintenance => "Website Maintenance",
            Self::WebsiteCreation => "Website Creation",
        }
    }
}

// ---------------------------------------------------------------------------
// Billing frequency
// ---------------------------------------------------------------------------

/// How a contract's `amount` is denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingFrequency {
    Monthly,
    Annual,
}

impl BillingFrequency {
    /// Stable storage identifier (matches the serde snake_case form).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Parse a storage identifier back into a billing frequency.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// An active service contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: DbId,
    pub last_name: String,
    pub first_name: String,
    pub company: Option<String>,
    /// Non-empty; display order preserved.
    pub service_types: Vec<ServiceType>,
    /// Non-negative, denominated in `billing_frequency`.
    pub amount: f64,
    pub billing_frequency: BillingFrequency,
    pub start_date: NaiveDate,
    /// `None` means open-ended.
    pub end_date: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl Contract {
    /// The contract's amount normalized to a monthly figure.
    ///
    /// Annual amounts are divided by 12; monthly amounts pass through.
    pub fn monthly_equivalent(&self) -> f64 {
        match self.billing_frequency {
            BillingFrequency::Monthly => self.amount,
            BillingFrequency::Annual => self.amount / 12.0,
        }
    }

    /// Whether the contract's end date has passed.
    ///
    /// Open-ended contracts never expire. A contract ending exactly on
    /// `today` is still active through that day.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.end_date, Some(end) if end < today)
    }

    /// Whether the contract's `[start_date, end_date ?? +inf)` interval
    /// overlaps the inclusive `[period_start, period_end]` window.
    pub fn active_during(&self, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.start_date <= period_end
            && self.end_date.map_or(true, |end| end >= period_start)
    }

    /// Validate the contract's field invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(
            &self.last_name,
            &self.first_name,
            &self.service_types,
            self.amount,
        )
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// A contract that has left the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedContract {
    /// Snapshot of the contract at archive time.
    pub contract: Contract,
    /// Set exactly once, when the contract is archived.
    pub archived_at: Timestamp,
    /// Caller-supplied reason, or [`AUTO_ARCHIVE_COMMENT`] when the expiry
    /// sweep triggered the archival.
    pub archive_comment: String,
}

/// Lifecycle view of a contract: exactly one of active or archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContractRecord {
    Active(Contract),
    Archived(ArchivedContract),
}

impl ContractRecord {
    /// The underlying contract, regardless of state.
    pub fn contract(&self) -> &Contract {
        match self {
            Self::Active(contract) => contract,
            Self::Archived(entry) => &entry.contract,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Input for creating a new contract. The id is assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
    pub last_name: String,
    pub first_name: String,
    pub company: Option<String>,
    pub service_types: Vec<ServiceType>,
    pub amount: f64,
    pub billing_frequency: BillingFrequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl NewContract {
    /// Validate the input before it is persisted.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(
            &self.last_name,
            &self.first_name,
            &self.service_types,
            self.amount,
        )
    }
}

/// Shared field validation for new and updated contracts.
fn validate_fields(
    last_name: &str,
    first_name: &str,
    service_types: &[ServiceType],
    amount: f64,
) -> Result<(), CoreError> {
    if last_name.trim().is_empty() {
        return Err(CoreError::Validation("Last name must not be empty".into()));
    }
    if first_name.trim().is_empty() {
        return Err(CoreError::Validation("First name must not be empty".into()));
    }
    if service_types.is_empty() {
        return Err(CoreError::Validation(
            "At least one service type is required".into(),
        ));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(
            "Amount must be a non-negative number".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract() -> Contract {
        Contract {
            id: 1,
            last_name: "Durand".to_string(),
            first_name: "Claire".to_string(),
            company: None,
            service_types: vec![ServiceType::Seo],
            amount: 100.0,
            billing_frequency: BillingFrequency::Monthly,
            start_date: date(2024, 1, 1),
            end_date: None,
            comment: None,
        }
    }

    // -- Normalization ----------------------------------------------------

    #[test]
    fn monthly_amount_passes_through() {
        assert_eq!(contract().monthly_equivalent(), 100.0);
    }

    #[test]
    fn annual_amount_divided_by_twelve() {
        let mut c = contract();
        c.amount = 1200.0;
        c.billing_frequency = BillingFrequency::Annual;
        assert_eq!(c.monthly_equivalent(), 100.0);
    }

    // -- Expiry -----------------------------------------------------------

    #[test]
    fn open_ended_contract_never_expires() {
        assert!(!contract().is_expired(date(2099, 1, 1)));
    }

    #[test]
    fn past_end_date_is_expired() {
        let mut c = contract();
        c.end_date = Some(date(2024, 6, 30));
        assert!(c.is_expired(date(2024, 7, 1)));
    }

    #[test]
    fn end_date_today_is_not_yet_expired() {
        let mut c = contract();
        c.end_date = Some(date(2024, 6, 30));
        assert!(!c.is_expired(date(2024, 6, 30)));
    }

    // -- Interval overlap -------------------------------------------------

    #[test]
    fn contract_starting_on_window_end_overlaps() {
        let mut c = contract();
        c.start_date = date(2024, 7, 31);
        assert!(c.active_during(date(2024, 7, 1), date(2024, 7, 31)));
    }

    #[test]
    fn contract_ending_on_window_start_overlaps() {
        let mut c = contract();
        c.end_date = Some(date(2024, 7, 1));
        assert!(c.active_during(date(2024, 7, 1), date(2024, 7, 31)));
    }

    #[test]
    fn contract_ended_before_window_does_not_overlap() {
        let mut c = contract();
        c.end_date = Some(date(2024, 6, 30));
        assert!(!c.active_during(date(2024, 7, 1), date(2024, 7, 31)));
    }

    // -- Validation -------------------------------------------------------

    fn input() -> NewContract {
        NewContract {
            last_name: "Durand".to_string(),
            first_name: "Claire".to_string(),
            company: Some("Durand SARL".to_string()),
            service_types: vec![ServiceType::Seo],
            amount: 250.0,
            billing_frequency: BillingFrequency::Monthly,
            start_date: date(2024, 1, 1),
            end_date: None,
            comment: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn blank_last_name_rejected() {
        let mut i = input();
        i.last_name = "   ".to_string();
        assert!(matches!(i.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn empty_first_name_rejected() {
        let mut i = input();
        i.first_name = String::new();
        assert!(matches!(i.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn no_service_types_rejected() {
        let mut i = input();
        i.service_types.clear();
        assert!(matches!(i.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn negative_amount_rejected() {
        let mut i = input();
        i.amount = -1.0;
        assert!(matches!(i.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn zero_amount_allowed() {
        let mut i = input();
        i.amount = 0.0;
        assert!(i.validate().is_ok());
    }

    // -- Serialization ----------------------------------------------------

    #[test]
    fn service_type_serializes_snake_case() {
        let json = serde_json::to_string(&ServiceType::WebDevelopment).unwrap();
        assert_eq!(json, "\"web_development\"");
    }

    #[test]
    fn service_type_round_trips_through_storage_form() {
        for t in ServiceType::ALL {
            assert_eq!(ServiceType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn billing_frequency_round_trips_through_storage_form() {
        assert_eq!(BillingFrequency::parse("monthly"), Some(BillingFrequency::Monthly));
        assert_eq!(BillingFrequency::parse("annual"), Some(BillingFrequency::Annual));
        assert_eq!(BillingFrequency::parse("weekly"), None);
    }

    #[test]
    fn dates_serialize_iso_8601() {
        let c = contract();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], serde_json::Value::Null);
    }
}
