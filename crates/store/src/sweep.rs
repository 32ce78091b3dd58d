//! Periodic archival of expired contracts.
//!
//! Spawns no tasks itself: the composition root owns the loop via
//! `tokio::spawn(sweep::run(store, cancel))` and stops it by cancelling
//! the token at teardown. The first tick fires immediately, so the
//! startup sweep happens as soon as the loop is running; tests that need
//! determinism call [`ContractStore::sweep_expired`] directly instead.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::store::ContractStore;

/// How often the sweep runs unless overridden.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600; // 1 hour

/// Run the expiry sweep loop.
///
/// The interval is read from `CONTRACT_SWEEP_INTERVAL_SECS` (seconds,
/// default 3600). Runs until `cancel` is triggered; sweep failures are
/// logged and the loop continues.
pub async fn run(store: Arc<ContractStore>, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("CONTRACT_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(interval_secs, "Contract expiry sweep started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Contract expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match store.sweep_expired().await {
                    Ok(0) => {
                        tracing::debug!("Expiry sweep: nothing to archive");
                    }
                    Ok(archived) => {
                        tracing::info!(archived, "Expiry sweep: contracts archived");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }
    }
}
