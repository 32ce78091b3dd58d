//! The contract store: single source of truth for active contracts and
//! the archive log.
//!
//! [`ContractStore`] composes the persistence layer, an in-memory snapshot
//! of both collections, and the change notifier into the stateful
//! component the presentation layer talks to. Every mutation persists
//! before it becomes visible, and subscribers are notified only after a
//! successful write. [`sweep::run`] is the cancellable background task
//! that archives expired contracts on an interval.

pub mod error;
pub mod store;
pub mod sweep;

pub use error::{StoreError, StoreResult};
pub use store::ContractStore;
