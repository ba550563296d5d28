use thiserror::Error;

use verdict_engine::EngineError;
use verdict_ledger::LedgerError;

/// Error type for the verdict service crate, aggregating errors from the
/// engine and ledger crates into the taxonomy callers act on.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced event or override does not exist. A client error,
    /// never retried.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected before anything was persisted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The audit write failed, so the evaluation was aborted: an
    /// unrecorded decision is never returned as if it were audited.
    #[error("decision could not be recorded: {0}")]
    RecordingFailed(String),

    /// A stored record failed signature verification.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(msg) => ServiceError::NotFound(msg),
            LedgerError::InvalidOverride(msg) => ServiceError::InvalidRequest(msg),
            LedgerError::Integrity(msg) => ServiceError::Integrity(msg),
            LedgerError::Store(msg) => ServiceError::Ledger(msg),
            LedgerError::Serialization(msg) => ServiceError::Serialization(msg),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(e: toml::de::Error) -> Self {
        ServiceError::Config(format!("TOML parse error: {}", e))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
