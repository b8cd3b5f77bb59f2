//! Engine error taxonomy.

use jobgrid_models::ApplicationStatus;
use jobgrid_store::StoreError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Domain errors surfaced by pipeline and policy operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or missing required fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// The (applicant, job) pair already has an application.
    #[error("an application for this job already exists")]
    DuplicateApplication,

    /// The job is not accepting applications.
    #[error("job is not accepting applications")]
    JobClosed,

    /// The requested status change is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    /// The principal lacks the role or ownership for the operation.
    #[error("not authorized: {0}")]
    Unauthorized(&'static str),

    /// No valid principal on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Resource absent, or outside the principal's visibility scope.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Persistence failure. Propagates as a fatal request failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Hide the existence of a resource: authorization failures become
    /// `NotFound` so probing by id leaks nothing.
    pub fn conceal(self, entity: &'static str) -> Self {
        match self {
            EngineError::Unauthorized(_) => EngineError::NotFound(entity),
            other => other,
        }
    }
}
