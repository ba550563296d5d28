use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::VerdictError;

// ---------------------------------------------------------------------------
// RiskLevel — four-level compliance risk classification
// ---------------------------------------------------------------------------

/// Four-level risk hierarchy with manual Ord implementation.
/// Exhaustive (no #[non_exhaustive]) so new levels force compile-time review
/// of all match sites.
///
/// Ordering: Minimal < Limited < High < Unacceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Limited,
    High,
    Unacceptable,
}

impl RiskLevel {
    /// Returns the ordinal position for strict total ordering.
    /// This is used for Ord, which establishes:
    /// Minimal < Limited < High < Unacceptable
    fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Minimal => 0,
            RiskLevel::Limited => 1,
            RiskLevel::High => 2,
            RiskLevel::Unacceptable => 3,
        }
    }

    /// The deterministic risk-to-decision mapping. Kept here so no other
    /// table can drift out of sync with it: unacceptable blocks, high and
    /// limited flag for review, minimal allows.
    pub fn default_decision(self) -> Decision {
        match self {
            RiskLevel::Unacceptable => Decision::Block,
            RiskLevel::High => Decision::Flag,
            RiskLevel::Limited => Decision::Flag,
            RiskLevel::Minimal => Decision::Allow,
        }
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "minimal"),
            RiskLevel::Limited => write!(f, "limited"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Unacceptable => write!(f, "unacceptable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision — three-way evaluation outcome
// ---------------------------------------------------------------------------

/// The authoritative outcome of one evaluation: content passes, goes to
/// human review, or is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Flag,
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Flag => write!(f, "flag"),
            Decision::Block => write!(f, "block"),
        }
    }
}

impl FromStr for Decision {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Decision::Allow),
            "flag" => Ok(Decision::Flag),
            "block" => Ok(Decision::Block),
            other => Err(VerdictError::Parse(format!(
                "unknown decision value '{}' (expected allow, flag, or block)",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SignalSource — which producer emitted a signal
// ---------------------------------------------------------------------------

/// Identifies the producer of an `EvaluationSignal`. The string forms are
/// part of the evidence key layout (`evidence/<event_id>/<source>.json`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Pattern,
    Vision,
    Classifier,
}

impl SignalSource {
    /// Precedence rank used when risk levels tie in fallback merging.
    /// Higher wins. Classifier outranks both but is handled as an
    /// authoritative switch before fallback ranking applies.
    pub fn priority(self) -> u8 {
        match self {
            SignalSource::Vision => 1,
            SignalSource::Pattern => 2,
            SignalSource::Classifier => 3,
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSource::Pattern => write!(f, "pattern"),
            SignalSource::Vision => write!(f, "vision"),
            SignalSource::Classifier => write!(f, "classifier"),
        }
    }
}

// ---------------------------------------------------------------------------
// InputKind — what kind of content was submitted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Image,
    File,
    TextWithImage,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Text => write!(f, "text"),
            InputKind::Image => write!(f, "image"),
            InputKind::File => write!(f, "file"),
            InputKind::TextWithImage => write!(f, "text_with_image"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp — canonical time representation (seconds + nanoseconds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds_since_epoch: u64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self {
            seconds_since_epoch: now.timestamp() as u64,
            nanoseconds: now.timestamp_subsec_nanos(),
        }
    }

    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds_since_epoch: seconds,
            nanoseconds: 0,
        }
    }

    pub fn to_rfc3339(&self) -> String {
        let dt =
            chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, self.nanoseconds);
        dt.map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "invalid".to_string())
    }

    /// Second-precision ISO-8601 UTC form used in canonical signing input,
    /// e.g. `2026-08-23T12:00:00Z`. Sub-second precision is deliberately
    /// dropped so re-serialization of a stored record cannot drift.
    pub fn to_canonical_utc(&self) -> String {
        let dt = chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, 0);
        dt.map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_else(|| "invalid".to_string())
    }

    /// Compact UTC date (`YYYYMMDD`) used as the prefix of generated ids.
    pub fn utc_date_compact(&self) -> String {
        let dt = chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, 0);
        dt.map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| "00000000".to_string())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Timestamp {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            seconds_since_epoch: dt.timestamp() as u64,
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed identifiers — prevent stringly-typed confusion
// ---------------------------------------------------------------------------

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    EventId,
    "Unique identifier for an audit event (`evt-<date>-<hex>`)."
);
define_id!(
    OverrideId,
    "Unique identifier for an audit override (`ovr-<date>-<hex>`)."
);
define_id!(UserId, "Identifier of the user who submitted content.");
define_id!(ClientId, "Identifier of the submitting client application.");
define_id!(
    PackVersion,
    "Version string of a policy pack, stamped into every decision."
);

// ---------------------------------------------------------------------------
// EvaluationSignal — one producer's opinion about a piece of content
// ---------------------------------------------------------------------------

/// A single producer's independent risk assessment. Immutable once produced;
/// owned by the merge engine for the duration of one evaluation and never
/// persisted directly (only referenced via evidence pointers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSignal {
    pub source: SignalSource,
    pub risk_level: RiskLevel,
    /// Policy tag labels this producer associates with the content.
    /// Set semantics (de-duplication, ordering) are applied at merge time.
    pub tags: Vec<String>,
    /// Producer confidence in [0, 1]. Rescaled to 0..=100 at merge time.
    pub confidence: f64,
    pub rationale: String,
    /// Opaque structured payload, stored out-of-band in the evidence
    /// sideband, never embedded in the signed audit record.
    pub raw_evidence: serde_json::Value,
}

// ---------------------------------------------------------------------------
// SignalOutcome — the three-outcome producer boundary
// ---------------------------------------------------------------------------

/// Result of asking one producer for its opinion. Producer failures are data
/// at this boundary, never exceptions crossing into the merge engine:
/// `Absent` means the producer ran (or was skipped) with nothing to report,
/// `Failed` means it was attempted and errored or timed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalOutcome {
    Signal(EvaluationSignal),
    Absent { source: SignalSource },
    Failed { source: SignalSource, detail: String },
}

impl SignalOutcome {
    pub fn source(&self) -> SignalSource {
        match self {
            SignalOutcome::Signal(signal) => signal.source,
            SignalOutcome::Absent { source } => *source,
            SignalOutcome::Failed { source, .. } => *source,
        }
    }

    pub fn signal(&self) -> Option<&EvaluationSignal> {
        match self {
            SignalOutcome::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EvaluationInput — the content handed to every producer
// ---------------------------------------------------------------------------

/// The submitted content as seen by signal producers. `metadata` carries
/// caller context (user, client) for producers that want it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub text: String,
    #[serde(default)]
    pub image: Option<Vec<u8>>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl EvaluationInput {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            metadata: HashMap::new(),
        }
    }
}
