use std::time::Duration;

use crate::error::VerdictResult;
use crate::types::{EvaluationInput, SignalOutcome, SignalSource};

// ---------------------------------------------------------------------------
// SignalProducer — the fixed contract with external detectors
//
// Producers (regex/NLP pattern scan, face detection, external classifier)
// live outside this core. Each is asked once per evaluation and answers with
// a three-outcome SignalOutcome; errors and timeouts are data, never panics
// crossing this boundary.
// ---------------------------------------------------------------------------

pub trait SignalProducer: Send + Sync {
    fn source(&self) -> SignalSource;

    /// Produce this source's opinion on the input, bounded by the
    /// caller-supplied timeout. Implementations that cross a process
    /// boundary (the classifier) must enforce the bound themselves.
    fn produce(&self, input: &EvaluationInput, timeout: Duration) -> SignalOutcome;
}

// ---------------------------------------------------------------------------
// EvidenceStore — best-effort blob sideband
//
// Raw signal evidence is referenced by the signed audit record but never
// embedded in it. Writes are idempotent overwrites keyed as
// `evidence/<event_id>/<signal-source>.json`.
// ---------------------------------------------------------------------------

pub trait EvidenceStore: Send + Sync {
    /// Store a payload under the given key, bounded by the caller-supplied
    /// timeout. Overwriting an existing key is permitted and idempotent.
    fn put(&self, key: &str, payload: &[u8], timeout: Duration) -> VerdictResult<()>;

    fn get(&self, key: &str) -> VerdictResult<Option<Vec<u8>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EvaluationSignal, RiskLevel};

    // Verify the trait objects are object-safe
    fn _assert_producer_object_safe(_: &dyn SignalProducer) {}
    fn _assert_evidence_object_safe(_: &dyn EvidenceStore) {}

    struct FixedProducer;

    impl SignalProducer for FixedProducer {
        fn source(&self) -> SignalSource {
            SignalSource::Pattern
        }

        fn produce(&self, input: &EvaluationInput, _timeout: Duration) -> SignalOutcome {
            if input.text.is_empty() {
                return SignalOutcome::Absent {
                    source: SignalSource::Pattern,
                };
            }
            SignalOutcome::Signal(EvaluationSignal {
                source: SignalSource::Pattern,
                risk_level: RiskLevel::High,
                tags: vec!["HighRiskAI".into()],
                confidence: 0.8,
                rationale: "matched high-risk pattern".into(),
                raw_evidence: serde_json::json!({"matches": ["credit scoring"]}),
            })
        }
    }

    #[test]
    fn test_producer_contract() {
        let producer = FixedProducer;
        assert_eq!(producer.source(), SignalSource::Pattern);

        let outcome = producer.produce(
            &EvaluationInput::text_only("credit scoring"),
            Duration::from_millis(100),
        );
        assert!(outcome.signal().is_some());

        let skipped = producer.produce(&EvaluationInput::text_only(""), Duration::from_millis(100));
        assert!(matches!(skipped, SignalOutcome::Absent { .. }));
    }
}
