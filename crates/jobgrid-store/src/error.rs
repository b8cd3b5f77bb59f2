//! Store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by repository operations.
///
/// The store stays domain-agnostic: `Duplicate` and `Precondition` are
/// mapped to domain errors (duplicate application, closed job, stale
/// transition) by the engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was violated.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// A guarded write found its precondition no longer holding.
    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    /// The store backend is unavailable. Not retried within a request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
