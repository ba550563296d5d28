use thiserror::Error;

use verdict_core::error::VerdictError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The requested event does not exist. Distinct from [`Integrity`]:
    /// absence is a lookup miss, never evidence of tampering.
    ///
    /// [`Integrity`]: LedgerError::Integrity
    #[error("not found: {0}")]
    NotFound(String),

    /// The override was rejected before anything was persisted.
    #[error("invalid override: {0}")]
    InvalidOverride(String),

    /// A stored record failed signature verification on read-back.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// The backing store failed.
    #[error("ledger store failure: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<VerdictError> for LedgerError {
    fn from(err: VerdictError) -> Self {
        match err {
            VerdictError::Serialization(msg) => LedgerError::Serialization(msg),
            other => LedgerError::Store(other.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
