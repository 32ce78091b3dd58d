//! Row models and their conversions into domain types.

pub mod contract;
