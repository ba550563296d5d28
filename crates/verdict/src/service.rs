//! The compliance evaluation service: drives producers, merges their
//! signals, and seals the outcome into the audit ledger.

use std::collections::HashMap;
use std::time::Duration;

use verdict_core::signer::{sha256_hex, Signer};
use verdict_core::traits::{EvidenceStore, SignalProducer};
use verdict_core::types::{
    ClientId, EvaluationInput, EventId, InputKind, SignalOutcome, UserId,
};
use verdict_engine::pack::{fallback_version, PackStore};
use verdict_engine::MergeEngine;
use verdict_ledger::{
    AuditEvent, AuditLedger, AuditOverride, EventContext, EventFilter, ExportBundle, LedgerStore,
    OverrideRequest,
};

use crate::config::VerdictConfig;
use crate::error::{ServiceError, ServiceResult};

/// One submission to evaluate.
#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub text: String,
    pub image: Option<Vec<u8>>,
    pub input_type: InputKind,
    pub user: UserId,
    pub client_id: ClientId,
}

/// Evaluates submissions end to end.
///
/// Every producer is asked once per evaluation; the merge is pure over
/// whatever came back; the ledger write is the only step allowed to fail
/// the call. All methods take `&self`, so one service instance serves any
/// number of concurrent callers.
pub struct ComplianceService<S: LedgerStore, E: EvidenceStore, P: PackStore> {
    producers: Vec<Box<dyn SignalProducer>>,
    packs: P,
    engine: MergeEngine,
    ledger: AuditLedger<S, E>,
    producer_timeout: Duration,
}

impl<S: LedgerStore, E: EvidenceStore, P: PackStore> ComplianceService<S, E, P> {
    /// Build a service from validated configuration.
    pub fn new(
        config: &VerdictConfig,
        producers: Vec<Box<dyn SignalProducer>>,
        packs: P,
        store: S,
        evidence: E,
    ) -> ServiceResult<Self> {
        config.validate()?;
        let signer = Signer::from_secret(config.signing.secret.as_bytes())
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        let engine = MergeEngine::new(config.engine.clone())?;
        let ledger = AuditLedger::new(
            store,
            evidence,
            signer,
            Duration::from_millis(config.ledger.evidence_timeout_ms),
        );
        Ok(Self {
            producers,
            packs,
            engine,
            ledger,
            producer_timeout: Duration::from_millis(config.producers.timeout_ms),
        })
    }

    /// Evaluate one submission and return its sealed audit event.
    ///
    /// Degrades gracefully through producer failures, but a ledger write
    /// failure aborts the whole call: an unrecorded decision is never
    /// handed back as if it were audited.
    pub fn evaluate(&self, request: EvaluateRequest) -> ServiceResult<AuditEvent> {
        let input_hash = hash_input(&request.text, request.image.as_deref());

        let mut metadata = HashMap::new();
        metadata.insert("user".to_string(), request.user.as_str().to_string());
        metadata.insert(
            "client_id".to_string(),
            request.client_id.as_str().to_string(),
        );
        let input = EvaluationInput {
            text: request.text,
            image: request.image,
            metadata,
        };

        let outcomes: Vec<SignalOutcome> = self
            .producers
            .iter()
            .map(|producer| producer.produce(&input, self.producer_timeout))
            .collect();

        // The active pack is re-read on every call so a pack swap takes
        // effect immediately. No active pack stamps the fallback version.
        let policy_version = self
            .packs
            .active()
            .map(|pack| pack.version)
            .unwrap_or_else(fallback_version);

        tracing::debug!(
            producers = outcomes.len(),
            policy_version = %policy_version,
            "merging producer outcomes"
        );
        let merged = self.engine.evaluate_outcomes(&outcomes, &policy_version);

        let context = EventContext {
            input_hash,
            input_type: request.input_type,
            user: request.user,
            client_id: request.client_id,
        };
        self.ledger
            .record(context, &merged)
            .map_err(|e| ServiceError::RecordingFailed(e.to_string()))
    }

    /// Fetch one audit event, verified.
    pub fn get_event(&self, event_id: &EventId) -> ServiceResult<AuditEvent> {
        Ok(self.ledger.get(event_id)?)
    }

    /// List audit events newest-first, verified.
    pub fn list_events(&self, filter: &EventFilter) -> ServiceResult<Vec<AuditEvent>> {
        Ok(self.ledger.list(filter)?)
    }

    /// Attach an operator override to a sealed event.
    pub fn create_override(
        &self,
        event_id: &EventId,
        request: OverrideRequest,
    ) -> ServiceResult<AuditOverride> {
        Ok(self.ledger.create_override(event_id, request)?)
    }

    /// Overrides for one event in ascending creation order, verified.
    pub fn overrides_for(&self, event_id: &EventId) -> ServiceResult<Vec<AuditOverride>> {
        Ok(self.ledger.overrides_for(event_id)?)
    }

    /// Assemble a verifiable export bundle for one event.
    pub fn export_bundle(&self, event_id: &EventId) -> ServiceResult<ExportBundle> {
        Ok(self.ledger.export_bundle(event_id)?)
    }

    /// Get a reference to the ledger (for testing/inspection).
    pub fn ledger(&self) -> &AuditLedger<S, E> {
        &self.ledger
    }

    /// Get a reference to the pack store (for testing/inspection).
    pub fn packs(&self) -> &P {
        &self.packs
    }
}

/// SHA-256 hex digest over the submitted content. When an image is
/// present the text is length-prefixed before the image bytes, so two
/// submissions that differ only in where the text/image split falls can
/// never share a digest.
fn hash_input(text: &str, image: Option<&[u8]>) -> String {
    match image {
        Some(image) => {
            let mut combined = Vec::with_capacity(8 + text.len() + image.len());
            combined.extend_from_slice(&(text.len() as u64).to_le_bytes());
            combined.extend_from_slice(text.as_bytes());
            combined.extend_from_slice(image);
            sha256_hex(&combined)
        }
        None => sha256_hex(text.as_bytes()),
    }
}
