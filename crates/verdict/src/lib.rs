//! Verdict Service Library
//!
//! Facade for the verdict compliance engine. Ties together signal
//! producers, the decision merge engine, policy packs, and the
//! tamper-evident audit ledger behind one service surface.
//!
//! # Architecture
//!
//! [`ComplianceService`] is a thin orchestrator. Per evaluation it asks
//! every registered producer for its opinion, merges the outcomes through
//! the pure engine against the active policy pack, and seals the result
//! into the signed ledger. Producers, pack storage, ledger storage, and
//! the evidence sideband all live behind traits, so deployments choose
//! their own backends; in-memory implementations of each ship with the
//! workspace.

pub mod config;
pub mod error;
pub mod service;

pub use config::{LedgerConfig, ProducerConfig, SigningConfig, VerdictConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::{ComplianceService, EvaluateRequest};

// Re-export the surface callers need without depending on every
// workspace crate directly.
pub use verdict_core::signer::{Signer, MIN_SECRET_LEN};
pub use verdict_core::traits::{EvidenceStore, SignalProducer};
pub use verdict_core::types::{
    ClientId, Decision, EvaluationInput, EvaluationSignal, EventId, InputKind, OverrideId,
    PackVersion, RiskLevel, SignalOutcome, SignalSource, Timestamp, UserId,
};
pub use verdict_engine::pack::{load_pack, InMemoryPackStore, PackStore, PolicyPack, PolicyTag};
pub use verdict_engine::types::{MergeConfig, PolicyDecision};
pub use verdict_ledger::{
    effective_decision, AuditEvent, AuditOverride, EventFilter, EvidenceRef, ExportBundle,
    InMemoryEvidenceStore, InMemoryLedgerStore, OverrideRequest,
};
