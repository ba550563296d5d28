//! The audit ledger: seals evaluations into signed events, attaches
//! operator overrides, and verifies everything it reads back.

use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use verdict_core::signer::Signer;
use verdict_core::traits::EvidenceStore;
use verdict_core::types::{
    ClientId, Decision, EventId, InputKind, OverrideId, Timestamp, UserId,
};
use verdict_engine::types::MergedEvaluation;

use crate::error::{LedgerError, LedgerResult};
use crate::event::{AuditEvent, AuditOverride, EvidenceRef};
use crate::export::{ExportBundle, ExportMetadata, EXPORT_SCHEMA_VERSION};
use crate::store::{EventFilter, LedgerStore, MAX_LIST_LIMIT};

/// Caller-supplied facts about the submission being recorded.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// SHA-256 hex digest of the submitted content.
    pub input_hash: String,
    pub input_type: InputKind,
    pub user: UserId,
    pub client_id: ClientId,
}

/// An operator's request to override a sealed decision.
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub operator: UserId,
    pub new_decision: Decision,
    pub reason: String,
    /// Lifetime in minutes; `None` makes the override permanent.
    pub duration_minutes: Option<u32>,
}

// ---------------------------------------------------------------------------
// AuditLedger
// ---------------------------------------------------------------------------

/// Tamper-evident audit ledger.
///
/// Every record is signed at write time and re-verified on every read
/// path, so a record that was altered underneath the ledger surfaces as
/// [`LedgerError::Integrity`] instead of being served as authentic.
pub struct AuditLedger<S: LedgerStore, E: EvidenceStore> {
    store: S,
    evidence: E,
    signer: Signer,
    evidence_timeout: Duration,
}

impl<S: LedgerStore, E: EvidenceStore> AuditLedger<S, E> {
    pub fn new(store: S, evidence: E, signer: Signer, evidence_timeout: Duration) -> Self {
        Self {
            store,
            evidence,
            signer,
            evidence_timeout,
        }
    }

    /// Get a reference to the backing store (for testing/inspection).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the evidence sideband (for testing/inspection).
    pub fn evidence_store(&self) -> &E {
        &self.evidence
    }

    /// Seal one evaluation into a signed audit event.
    ///
    /// Evidence writes are best-effort and happen first; a failed write
    /// degrades to a [`EvidenceRef::StorageFailed`] marker. The event
    /// insert itself is not best-effort: if the store rejects it the
    /// decision was never recorded and the error propagates.
    pub fn record(
        &self,
        context: EventContext,
        evaluation: &MergedEvaluation,
    ) -> LedgerResult<AuditEvent> {
        let timestamp = Timestamp::now();
        let event_id = generate_event_id(&timestamp);

        let mut evidence_refs = Vec::with_capacity(evaluation.evidence.entries.len());
        for entry in &evaluation.evidence.entries {
            let key = format!("evidence/{}/{}.json", event_id, entry.source);
            let payload = serde_json::to_vec(&entry.body)
                .map_err(|e| LedgerError::Serialization(e.to_string()))?;
            match self.evidence.put(&key, &payload, self.evidence_timeout) {
                Ok(()) => evidence_refs.push(EvidenceRef::Stored(key)),
                Err(err) => {
                    tracing::warn!(
                        event_id = %event_id,
                        source = %entry.source,
                        error = %err,
                        "evidence write failed, recording marker"
                    );
                    evidence_refs.push(EvidenceRef::StorageFailed {
                        source: entry.source,
                    });
                }
            }
        }

        let decision = &evaluation.decision;
        let mut event = AuditEvent {
            event_id,
            timestamp,
            input_hash: context.input_hash,
            input_type: context.input_type,
            user: context.user,
            client_id: context.client_id,
            decision: decision.decision,
            risk_level: decision.risk_level,
            policy_tags: decision.policy_tags.clone(),
            policy_version: decision.policy_version.clone(),
            confidence_score: decision.confidence_score,
            explanation: decision.explanation.clone(),
            evidence_refs,
            signature: String::new(),
        };
        let bytes = event.signable_record().to_bytes()?;
        event.signature = self.signer.sign(&bytes);

        self.store.insert_event(&event)?;
        tracing::info!(
            event_id = %event.event_id,
            decision = %event.decision,
            risk_level = %event.risk_level,
            policy_version = %event.policy_version,
            "audit event recorded"
        );
        Ok(event)
    }

    /// Attach a signed override to an existing event.
    ///
    /// The target event must exist and verify first; an invalid request
    /// is rejected before anything is persisted.
    pub fn create_override(
        &self,
        event_id: &EventId,
        request: OverrideRequest,
    ) -> LedgerResult<AuditOverride> {
        let event = self.fetch_verified(event_id)?;

        if request.reason.trim().is_empty() {
            return Err(LedgerError::InvalidOverride(
                "override reason must not be blank".to_string(),
            ));
        }
        if request.duration_minutes == Some(0) {
            return Err(LedgerError::InvalidOverride(
                "override duration must be at least one minute".to_string(),
            ));
        }

        let timestamp = Timestamp::now();
        let mut record = AuditOverride {
            override_id: generate_override_id(&timestamp),
            original_event_id: event.event_id,
            timestamp,
            operator: request.operator,
            new_decision: request.new_decision,
            reason: request.reason,
            duration_minutes: request.duration_minutes,
            signature: String::new(),
        };
        let bytes = record.signable_record().to_bytes()?;
        record.signature = self.signer.sign(&bytes);

        self.store.insert_override(&record)?;
        tracing::info!(
            override_id = %record.override_id,
            event_id = %event_id,
            new_decision = %record.new_decision,
            "override recorded"
        );
        Ok(record)
    }

    /// Fetch one event, verifying its signature.
    pub fn get(&self, event_id: &EventId) -> LedgerResult<AuditEvent> {
        self.fetch_verified(event_id)
    }

    /// List events newest-first, verifying every signature in the page.
    /// The filter's limit is capped at [`MAX_LIST_LIMIT`].
    pub fn list(&self, filter: &EventFilter) -> LedgerResult<Vec<AuditEvent>> {
        let mut bounded = filter.clone();
        bounded.limit = bounded.limit.min(MAX_LIST_LIMIT);

        let events = self.store.events(&bounded)?;
        for event in &events {
            self.verify_event(event)?;
        }
        Ok(events)
    }

    /// Overrides for one event in ascending creation order, all verified.
    /// The event itself must exist and verify.
    pub fn overrides_for(&self, event_id: &EventId) -> LedgerResult<Vec<AuditOverride>> {
        self.fetch_verified(event_id)?;
        let overrides = self.store.overrides_for(event_id)?;
        for record in &overrides {
            self.verify_override(record)?;
        }
        Ok(overrides)
    }

    /// Assemble a verifiable export bundle for one event.
    ///
    /// Every signature in the bundle is re-verified before export, and the
    /// bundle carries the stored signatures unchanged: export never
    /// re-signs anything.
    pub fn export_bundle(&self, event_id: &EventId) -> LedgerResult<ExportBundle> {
        let audit_event = self.fetch_verified(event_id)?;
        let overrides = self.store.overrides_for(event_id)?;
        for record in &overrides {
            self.verify_override(record)?;
        }

        Ok(ExportBundle {
            audit_event,
            overrides,
            metadata: ExportMetadata {
                exported_at: Timestamp::now(),
                schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            },
        })
    }

    fn fetch_verified(&self, event_id: &EventId) -> LedgerResult<AuditEvent> {
        let event = self.store.event(event_id)?.ok_or_else(|| {
            LedgerError::NotFound(format!("audit event '{}' not found", event_id))
        })?;
        self.verify_event(&event)?;
        Ok(event)
    }

    fn verify_event(&self, event: &AuditEvent) -> LedgerResult<()> {
        let bytes = event.signable_record().to_bytes()?;
        if !self.signer.verify(&bytes, &event.signature) {
            return Err(LedgerError::Integrity(format!(
                "audit event '{}' failed signature verification",
                event.event_id
            )));
        }
        Ok(())
    }

    fn verify_override(&self, record: &AuditOverride) -> LedgerResult<()> {
        let bytes = record.signable_record().to_bytes()?;
        if !self.signer.verify(&bytes, &record.signature) {
            return Err(LedgerError::Integrity(format!(
                "override '{}' failed signature verification",
                record.override_id
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

/// `evt-<YYYYMMDD>-<16 hex>`: a UTC date prefix for human scanning plus
/// 64 bits from the OS RNG. No coordination between writers is needed.
fn generate_event_id(timestamp: &Timestamp) -> EventId {
    EventId::new(format!(
        "evt-{}-{}",
        timestamp.utc_date_compact(),
        random_suffix()
    ))
}

fn generate_override_id(timestamp: &Timestamp) -> OverrideId {
    OverrideId::new(format!(
        "ovr-{}-{}",
        timestamp.utc_date_compact(),
        random_suffix()
    ))
}

fn random_suffix() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
