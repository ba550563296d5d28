//! Verdict Merge Engine
//!
//! Reconciles the risk signals gathered for one evaluation into a single
//! enforceable decision: ALLOW, FLAG, or BLOCK.
//!
//! Key features:
//! - Classifier-authoritative merge: a classifier verdict supersedes rule signals
//! - Highest-risk-wins fallback with source-priority tie-breaking (pattern > vision)
//! - Pure, total merge: same signals and pack version always yield the same decision
//! - Producer failures fold into evidence, never into the decision itself
//! - Versioned policy packs with structural validation and atomic activation
//! - Every decision stamped with the pack version it was evaluated against

pub mod engine;
pub mod error;
pub mod pack;
pub mod types;

// Re-export primary types for convenience
pub use engine::{MergeEngine, MAX_BASELINE_CONFIDENCE, MIN_BASELINE_CONFIDENCE};
pub use error::{EngineError, EngineResult};
pub use pack::{
    fallback_version, load_pack, save_pack, validate_pack, InMemoryPackStore, PackStore,
    PolicyPack, PolicyTag, FALLBACK_PACK_VERSION,
};
pub use types::{
    default_baseline_confidence, EvidenceBody, EvidenceBundle, EvidenceEntry, MergeConfig,
    MergedEvaluation, PolicyDecision,
};
