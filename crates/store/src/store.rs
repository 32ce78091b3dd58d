//! The contract store.

use chrono::Utc;
use tokio::sync::RwLock;

use clientele_core::contract::{
    ArchivedContract, Contract, NewContract, AUTO_ARCHIVE_COMMENT,
};
use clientele_core::error::CoreError;
use clientele_core::revenue::{self, MonthlyStats, ServiceTypeShare};
use clientele_core::types::DbId;
use clientele_db::repositories::ContractRepo;
use clientele_db::DbPool;
use clientele_events::{ChangeNotifier, SubscriberId};

use crate::error::StoreResult;

/// Single source of truth for active contracts and the archive log.
///
/// Holds an in-memory snapshot of both collections beside the database.
/// Mutations follow one path: validate, persist, refresh the snapshot
/// from the returned row, notify. Readers therefore never observe a
/// half-applied mutation, and on a persistence failure the snapshot
/// keeps its last confirmed state.
pub struct ContractStore {
    pool: DbPool,
    active: RwLock<Vec<Contract>>,
    /// Most recently archived first.
    archive: RwLock<Vec<ArchivedContract>>,
    notifier: ChangeNotifier,
}

impl ContractStore {
    /// Create a store over an existing pool. Call [`load`](Self::load)
    /// before serving reads.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            active: RwLock::new(Vec::new()),
            archive: RwLock::new(Vec::new()),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Bulk-read both collections from storage, replacing the snapshot.
    pub async fn load(&self) -> StoreResult<()> {
        let active_rows = ContractRepo::list(&self.pool).await?;
        let archived_rows = ContractRepo::list_archived(&self.pool).await?;

        let mut active = Vec::with_capacity(active_rows.len());
        for row in active_rows {
            active.push(row.into_active()?);
        }
        let mut archive = Vec::with_capacity(archived_rows.len());
        for row in archived_rows {
            archive.push(row.into_archived()?);
        }

        *self.active.write().await = active;
        *self.archive.write().await = archive;

        tracing::debug!(
            active = self.active.read().await.len(),
            archived = self.archive.read().await.len(),
            "Contract store loaded"
        );
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────────────

    /// Snapshot of active contracts in insertion order.
    pub async fn list(&self) -> Vec<Contract> {
        self.active.read().await.clone()
    }

    /// Single active contract lookup.
    pub async fn get(&self, id: DbId) -> Option<Contract> {
        self.active.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Snapshot of the archive log, most recently archived first.
    pub async fn archived(&self) -> Vec<ArchivedContract> {
        self.archive.read().await.clone()
    }

    /// Archive entries originating from one contract.
    pub async fn archived_history_of(&self, contract_id: DbId) -> Vec<ArchivedContract> {
        self.archive
            .read()
            .await
            .iter()
            .filter(|entry| entry.contract.id == contract_id)
            .cloned()
            .collect()
    }

    // ── Mutations ─────────────────────────────────────────────────────

    /// Validate and persist a new contract, returning it with its
    /// assigned id.
    pub async fn create(&self, input: NewContract) -> StoreResult<Contract> {
        input.validate()?;

        let row = ContractRepo::create(&self.pool, &input).await?;
        let contract = row.into_active()?;

        self.active.write().await.push(contract.clone());
        self.notifier.notify();

        tracing::debug!(id = contract.id, "Contract created");
        Ok(contract)
    }

    /// Replace the stored record matching `contract.id`.
    pub async fn update(&self, contract: Contract) -> StoreResult<Contract> {
        contract.validate()?;

        let row = ContractRepo::update(&self.pool, &contract)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "contract",
                id: contract.id,
            })?;
        let updated = row.into_active()?;

        {
            let mut active = self.active.write().await;
            if let Some(slot) = active.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
        }
        self.notifier.notify();

        tracing::debug!(id = updated.id, "Contract updated");
        Ok(updated)
    }

    /// Remove a contract from the active set without archiving it.
    pub async fn delete(&self, id: DbId) -> StoreResult<()> {
        let deleted = ContractRepo::hard_delete(&self.pool, id).await?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "contract",
                id,
            }
            .into());
        }

        self.active.write().await.retain(|c| c.id != id);
        self.notifier.notify();

        tracing::debug!(id, "Contract deleted");
        Ok(())
    }

    /// Move an active contract to the archive with the caller's reason.
    pub async fn archive(&self, id: DbId, comment: &str) -> StoreResult<ArchivedContract> {
        if comment.trim().is_empty() {
            return Err(CoreError::Validation(
                "An archive comment is required".into(),
            )
            .into());
        }

        let row = ContractRepo::archive(&self.pool, id, comment, Utc::now())
            .await?
            .ok_or(CoreError::NotFound {
                entity: "contract",
                id,
            })?;
        let entry = row.into_archived()?;

        self.active.write().await.retain(|c| c.id != id);
        self.archive.write().await.insert(0, entry.clone());
        self.notifier.notify();

        tracing::info!(id, "Contract archived");
        Ok(entry)
    }

    /// Mutate only the comment of an existing archive entry.
    pub async fn update_archive_comment(
        &self,
        archive_id: DbId,
        comment: &str,
    ) -> StoreResult<ArchivedContract> {
        let row = ContractRepo::update_archive_comment(&self.pool, archive_id, comment)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "archive entry",
                id: archive_id,
            })?;
        let entry = row.into_archived()?;

        {
            let mut archive = self.archive.write().await;
            if let Some(slot) = archive
                .iter_mut()
                .find(|e| e.contract.id == entry.contract.id)
            {
                *slot = entry.clone();
            }
        }
        self.notifier.notify();

        Ok(entry)
    }

    /// Archive every active contract whose end date has passed, with the
    /// system comment. Returns the number archived; subscribers are
    /// notified exactly once when that number is positive.
    pub async fn sweep_expired(&self) -> StoreResult<usize> {
        let now = Utc::now();
        let rows =
            ContractRepo::archive_expired(&self.pool, now.date_naive(), AUTO_ARCHIVE_COMMENT, now)
                .await?;
        if rows.is_empty() {
            return Ok(0);
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(row.into_archived()?);
        }
        let count = entries.len();

        {
            let mut active = self.active.write().await;
            active.retain(|c| !entries.iter().any(|e| e.contract.id == c.id));
        }
        {
            let mut archive = self.archive.write().await;
            for entry in entries {
                archive.insert(0, entry);
            }
        }
        self.notifier.notify();

        tracing::info!(count, "Expired contracts archived");
        Ok(count)
    }

    // ── Notifications ─────────────────────────────────────────────────

    /// Register a change callback; fires after every successful mutation.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriberId {
        self.notifier.subscribe(callback)
    }

    /// Deregister a change callback.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ── Statistics ────────────────────────────────────────────────────

    /// Normalized monthly revenue of the active set.
    pub async fn monthly_revenue(&self) -> f64 {
        revenue::monthly_revenue(&self.active.read().await)
    }

    /// Number of active contracts.
    pub async fn active_contract_count(&self) -> usize {
        revenue::active_contract_count(&self.active.read().await)
    }

    /// Service-type distribution of the active set.
    pub async fn service_type_distribution(&self) -> Vec<ServiceTypeShare> {
        revenue::service_type_distribution(&self.active.read().await)
    }

    /// Trailing monthly revenue series over active and archived contracts.
    ///
    /// Archived contracts stay visible to the months they were active in;
    /// their interval is clamped at the archival date so they stop
    /// contributing afterwards.
    pub async fn monthly_history(&self, window_months: u32) -> Vec<MonthlyStats> {
        let contracts = self.history_snapshot().await;
        revenue::monthly_history(&contracts, Utc::now().date_naive(), window_months)
    }

    /// CSV statistics export over the same snapshot as
    /// [`monthly_history`](Self::monthly_history).
    pub async fn export_stats_csv(&self) -> StoreResult<String> {
        let contracts = self.history_snapshot().await;
        Ok(revenue::export_stats_csv(
            &contracts,
            Utc::now().date_naive(),
        )?)
    }

    /// Active contracts plus archived snapshots with their intervals
    /// clamped at the archival date.
    async fn history_snapshot(&self) -> Vec<Contract> {
        let mut contracts = self.active.read().await.clone();
        contracts.extend(self.archive.read().await.iter().map(effective_contract));
        contracts
    }
}

/// An archived contract's revenue-bearing interval ends at its end date
/// or its archival date, whichever came first.
fn effective_contract(entry: &ArchivedContract) -> Contract {
    let archived_on = entry.archived_at.date_naive();
    let mut contract = entry.contract.clone();
    contract.end_date = Some(match contract.end_date {
        Some(end) if end < archived_on => end,
        _ => archived_on,
    });
    contract
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use clientele_core::contract::{BillingFrequency, ServiceType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn archived(end_date: Option<NaiveDate>, archived_on: NaiveDate) -> ArchivedContract {
        ArchivedContract {
            contract: Contract {
                id: 1,
                last_name: "Martin".to_string(),
                first_name: "Test".to_string(),
                company: None,
                service_types: vec![ServiceType::Seo],
                amount: 100.0,
                billing_frequency: BillingFrequency::Monthly,
                start_date: date(2024, 1, 1),
                end_date,
                comment: None,
            },
            archived_at: Utc
                .from_utc_datetime(&archived_on.and_hms_opt(9, 0, 0).unwrap()),
            archive_comment: "note".to_string(),
        }
    }

    #[test]
    fn open_ended_archived_contract_clamps_to_archival_date() {
        let entry = archived(None, date(2024, 3, 15));
        assert_eq!(effective_contract(&entry).end_date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn earlier_end_date_wins_over_archival_date() {
        let entry = archived(Some(date(2024, 2, 1)), date(2024, 3, 15));
        assert_eq!(effective_contract(&entry).end_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn early_manual_archive_clamps_a_later_end_date() {
        let entry = archived(Some(date(2024, 12, 31)), date(2024, 3, 15));
        assert_eq!(effective_contract(&entry).end_date, Some(date(2024, 3, 15)));
    }
}
