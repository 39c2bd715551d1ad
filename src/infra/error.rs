//! Error taxonomy for the Verdantia core.

use thiserror::Error;

/// Errors surfaced by the ledgers and collaborators.
///
/// `NotFound` deliberately covers both "no such record" and "not owned by
/// the caller" so existence of other users' data is never leaked;
/// `Forbidden` is used only where the record's existence is already
/// implied (e.g. deleting an approved report you own) or where a role
/// check failed.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or out-of-range input; nothing was mutated
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate pending submission or duplicate username; nothing was mutated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown record, or a record the caller does not own
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Role or eligibility check failed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Guarded debit rejected; balance unchanged
    #[error("insufficient points balance")]
    InsufficientBalance,

    /// Backing store failure, retryable from the caller's perspective
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Artifact store failure
    #[error("artifact store error: {0}")]
    Artifact(#[from] std::io::Error),

    /// Anything that indicates a bug rather than a caller mistake
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Map a sqlx error to `Conflict` when it is a unique-constraint
    /// violation, otherwise pass it through as a database failure.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return CoreError::Conflict(message.to_string());
            }
        }
        CoreError::Database(err)
    }
}
