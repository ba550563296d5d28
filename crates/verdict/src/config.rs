use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use verdict_core::signer::MIN_SECRET_LEN;
use verdict_engine::types::MergeConfig;
use verdict_engine::{MAX_BASELINE_CONFIDENCE, MIN_BASELINE_CONFIDENCE};

use crate::error::{ServiceError, ServiceResult};

/// Configuration for audit record signing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Shared HMAC secret. Must be set before the service can start;
    /// there is no usable default.
    #[serde(default)]
    pub secret: String,
}

/// Configuration for signal producers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Bound on each producer call in milliseconds. Applied uniformly;
    /// only producers that cross a process boundary (the classifier)
    /// are expected to come anywhere near it.
    #[serde(default = "default_producer_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_producer_timeout_ms() -> u64 {
    2000
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_producer_timeout_ms(),
        }
    }
}

/// Configuration for the audit ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Bound on each evidence sideband write in milliseconds.
    #[serde(default = "default_evidence_timeout_ms")]
    pub evidence_timeout_ms: u64,
}

fn default_evidence_timeout_ms() -> u64 {
    1000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            evidence_timeout_ms: default_evidence_timeout_ms(),
        }
    }
}

/// Top-level configuration for the verdict service.
///
/// Loaded from a TOML file (typically `~/.verdict/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictConfig {
    /// Signing configuration.
    #[serde(default)]
    pub signing: SigningConfig,

    /// Merge engine configuration.
    #[serde(default)]
    pub engine: MergeConfig,

    /// Signal producer configuration.
    #[serde(default)]
    pub producers: ProducerConfig,

    /// Audit ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Returns `$HOME/<suffix>` if HOME is available, otherwise `./<suffix>`.
fn dirs_or_default(suffix: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(suffix))
        .unwrap_or_else(|_| PathBuf::from(suffix))
}

impl VerdictConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration (which still needs a secret before
    /// a service can be built from it).
    pub fn load(path: &Path) -> ServiceResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ServiceError::Io)?;
        let config: VerdictConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> ServiceResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ServiceError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ServiceError::Io)?;
        }
        std::fs::write(path, contents).map_err(ServiceError::Io)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.signing.secret.is_empty() {
            return Err(ServiceError::Config(
                "signing.secret must be set".to_string(),
            ));
        }
        if self.signing.secret.len() < MIN_SECRET_LEN {
            return Err(ServiceError::Config(format!(
                "signing.secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.signing.secret.len()
            )));
        }
        if self.engine.baseline_confidence < MIN_BASELINE_CONFIDENCE
            || self.engine.baseline_confidence > MAX_BASELINE_CONFIDENCE
        {
            return Err(ServiceError::Config(format!(
                "engine.baseline_confidence must be between {} and {}, got {}",
                MIN_BASELINE_CONFIDENCE, MAX_BASELINE_CONFIDENCE, self.engine.baseline_confidence
            )));
        }
        if self.producers.timeout_ms == 0 {
            return Err(ServiceError::Config(
                "producers.timeout_ms must be > 0".into(),
            ));
        }
        if self.ledger.evidence_timeout_ms == 0 {
            return Err(ServiceError::Config(
                "ledger.evidence_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Return the path to the default config file location.
    pub fn default_config_path() -> PathBuf {
        dirs_or_default(".verdict/config.toml")
    }
}
