//! Decision merge engine.
//!
//! Reconciles the signals gathered for one evaluation into a single
//! [`PolicyDecision`]. A classifier signal is authoritative when present;
//! otherwise the highest-risk rule signal wins, with ties broken by
//! source priority (pattern over vision). The merge is pure and total:
//! the same signals and pack version always produce the same decision,
//! and no combination of signals can make it fail.

use verdict_core::types::{
    Decision, EvaluationSignal, PackVersion, RiskLevel, SignalOutcome, SignalSource,
};

use crate::error::{EngineError, EngineResult};
use crate::types::{
    EvidenceBody, EvidenceBundle, EvidenceEntry, MergeConfig, MergedEvaluation, PolicyDecision,
};

/// Explanation reported when no signal fired at all.
const CLEAN_EXPLANATION: &str = "No policy violations detected";

/// Lowest baseline confidence the engine will accept.
pub const MIN_BASELINE_CONFIDENCE: u8 = 10;

/// Highest baseline confidence the engine will accept.
pub const MAX_BASELINE_CONFIDENCE: u8 = 20;

// ---------------------------------------------------------------------------
// MergeEngine — signal reconciliation
// ---------------------------------------------------------------------------

/// Merges per-producer signals into one enforceable decision.
pub struct MergeEngine {
    config: MergeConfig,
}

impl MergeEngine {
    /// Creates an engine, rejecting baselines that would overstate or
    /// understate confidence in a clean evaluation.
    pub fn new(config: MergeConfig) -> EngineResult<Self> {
        if config.baseline_confidence < MIN_BASELINE_CONFIDENCE
            || config.baseline_confidence > MAX_BASELINE_CONFIDENCE
        {
            return Err(EngineError::Validation(format!(
                "baseline_confidence must be between {} and {}, got {}",
                MIN_BASELINE_CONFIDENCE, MAX_BASELINE_CONFIDENCE, config.baseline_confidence
            )));
        }
        Ok(MergeEngine { config })
    }

    /// Merges signals into a decision stamped with `policy_version`.
    ///
    /// Total over its inputs: every signal combination maps to a decision,
    /// and identical inputs always yield identical output.
    pub fn merge(
        &self,
        signals: &[EvaluationSignal],
        policy_version: &PackVersion,
    ) -> PolicyDecision {
        // The classifier sees the full input in context, so its verdict
        // supersedes the rule-based signals outright.
        if let Some(classifier) = signals
            .iter()
            .find(|signal| signal.source == SignalSource::Classifier)
        {
            return PolicyDecision {
                decision: classifier.risk_level.default_decision(),
                risk_level: classifier.risk_level,
                policy_tags: collect_tags(&[classifier]),
                confidence_score: scale_confidence(classifier.confidence),
                explanation: classifier.rationale.clone(),
                policy_version: policy_version.clone(),
            };
        }

        let rule_signals: Vec<&EvaluationSignal> = signals
            .iter()
            .filter(|signal| signal.source != SignalSource::Classifier)
            .collect();

        if rule_signals.is_empty() {
            return self.clean_decision(policy_version);
        }

        // Highest risk wins. On equal risk the higher-priority source wins,
        // and a full tie keeps the first signal seen.
        let mut winner = rule_signals[0];
        for candidate in &rule_signals[1..] {
            let outranks = candidate.risk_level > winner.risk_level
                || (candidate.risk_level == winner.risk_level
                    && candidate.source.priority() > winner.source.priority());
            if outranks {
                winner = candidate;
            }
        }

        // Every signal at the winning risk level contributes tags and
        // explanation text, visited in source-priority order so the output
        // is stable regardless of producer completion order.
        let mut contributing: Vec<&EvaluationSignal> = rule_signals
            .iter()
            .copied()
            .filter(|signal| signal.risk_level == winner.risk_level)
            .collect();
        contributing.sort_by(|a, b| b.source.priority().cmp(&a.source.priority()));

        let explanation = contributing
            .iter()
            .map(|signal| signal.rationale.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        PolicyDecision {
            decision: winner.risk_level.default_decision(),
            risk_level: winner.risk_level,
            policy_tags: collect_tags(&contributing),
            confidence_score: scale_confidence(winner.confidence),
            explanation,
            policy_version: policy_version.clone(),
        }
    }

    /// Merges producer outcomes, folding failures into the evidence bundle
    /// instead of the decision: a failed producer degrades coverage, and
    /// the audit trail records that it did.
    pub fn evaluate_outcomes(
        &self,
        outcomes: &[SignalOutcome],
        policy_version: &PackVersion,
    ) -> MergedEvaluation {
        let mut signals = Vec::new();
        let mut entries = Vec::new();
        for outcome in outcomes {
            match outcome {
                SignalOutcome::Signal(signal) => {
                    entries.push(EvidenceEntry {
                        source: signal.source,
                        body: EvidenceBody::Signal(signal.raw_evidence.clone()),
                    });
                    signals.push(signal.clone());
                }
                SignalOutcome::Failed { source, detail } => {
                    tracing::warn!(
                        source = %source,
                        detail = %detail,
                        "signal producer failed, merging without it"
                    );
                    entries.push(EvidenceEntry {
                        source: *source,
                        body: EvidenceBody::ProducerFailure(detail.clone()),
                    });
                }
                SignalOutcome::Absent { .. } => {}
            }
        }

        MergedEvaluation {
            decision: self.merge(&signals, policy_version),
            evidence: EvidenceBundle { entries },
        }
    }

    fn clean_decision(&self, policy_version: &PackVersion) -> PolicyDecision {
        PolicyDecision {
            decision: Decision::Allow,
            risk_level: RiskLevel::Minimal,
            policy_tags: Vec::new(),
            confidence_score: self.config.baseline_confidence,
            explanation: CLEAN_EXPLANATION.to_string(),
            policy_version: policy_version.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge helpers
// ---------------------------------------------------------------------------

/// Accumulates tags across signals, keeping first-seen order and dropping
/// duplicates.
fn collect_tags(signals: &[&EvaluationSignal]) -> Vec<String> {
    let mut tags = Vec::new();
    for signal in signals {
        for tag in &signal.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// Scales producer confidence from the unit interval to 0-100, clamping
/// out-of-range values from misbehaving producers.
fn scale_confidence(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}
