//! Domain model and pure revenue statistics for the clientele contract
//! manager.
//!
//! This crate has zero internal dependencies and never touches storage,
//! the clock, or the network. It provides:
//!
//! - [`contract`] — the contract data model, its lifecycle sum type, and
//!   input validation.
//! - [`revenue`] — stateless aggregation over contract snapshots
//!   (normalized monthly revenue, service-type distribution, trailing
//!   monthly history, CSV export).
//! - [`error`] — the domain error taxonomy.

pub mod contract;
pub mod error;
pub mod revenue;
pub mod types;

pub use contract::{ArchivedContract, BillingFrequency, Contract, ContractRecord, NewContract, ServiceType};
pub use error::CoreError;
