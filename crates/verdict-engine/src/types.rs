//! Core types produced and consumed by the merge engine.

use serde::{Deserialize, Serialize};
use verdict_core::types::{Decision, PackVersion, RiskLevel, SignalSource};

/// The merged outcome of one evaluation, stamped with the policy pack
/// version that was active when the decision was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Enforcement action the caller must apply.
    pub decision: Decision,
    /// Highest risk level that survived the merge.
    pub risk_level: RiskLevel,
    /// Distinct policy tags contributed by the signals behind the decision.
    pub policy_tags: Vec<String>,
    /// Confidence in the decision, scaled to the 0-100 range.
    pub confidence_score: u8,
    /// Human-readable account of why the decision was reached.
    pub explanation: String,
    /// Version of the policy pack the decision was evaluated against.
    pub policy_version: PackVersion,
}

/// Tunable knobs for the merge engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Confidence reported when no signal fired at all. Low but nonzero:
    /// absence of findings is weak evidence, not proof of safety.
    #[serde(default = "default_baseline_confidence")]
    pub baseline_confidence: u8,
}

/// Baseline confidence for clean evaluations.
pub fn default_baseline_confidence() -> u8 {
    15
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            baseline_confidence: default_baseline_confidence(),
        }
    }
}

/// Raw material captured from one signal producer during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBody {
    /// The producer ran and returned its raw findings.
    Signal(serde_json::Value),
    /// The producer failed; the detail records what went wrong so the
    /// audit trail shows the evaluation was degraded, not silently clean.
    ProducerFailure(String),
}

/// Evidence from a single producer, keyed by its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub source: SignalSource,
    pub body: EvidenceBody,
}

/// All evidence gathered for one evaluation, in producer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub entries: Vec<EvidenceEntry>,
}

impl EvidenceBundle {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A merged decision together with the evidence that backs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEvaluation {
    pub decision: PolicyDecision,
    pub evidence: EvidenceBundle,
}
