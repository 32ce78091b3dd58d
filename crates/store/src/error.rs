use clientele_core::error::CoreError;

/// Error type for contract store operations.
///
/// Wraps [`CoreError`] for domain failures (validation, missing ids) and
/// adds the persistence variant. On a persistence failure the in-memory
/// snapshot keeps its last confirmed state: mutations are applied to the
/// snapshot only after the database write succeeds.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error from `clientele_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for store operation results.
pub type StoreResult<T> = Result<T, StoreError>;
