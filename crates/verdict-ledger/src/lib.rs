//! Verdict Audit Ledger
//!
//! Tamper-evident record of every evaluation the engine makes. Events are
//! sealed with an HMAC-SHA-256 signature over a canonical field subset at
//! write time, corrections arrive as append-only signed overrides, and
//! every read path re-verifies what it returns.
//!
//! Key features:
//! - Events written exactly once, never updated in place
//! - Append-only operator overrides with read-time expiry projection
//! - Uniform read-back verification: a tampered record surfaces as an
//!   integrity error, never as authentic data
//! - Best-effort evidence sideband; storage failures become markers in the
//!   record instead of lost evaluations
//! - Self-contained export bundles that re-verify long after export

pub mod error;
pub mod event;
pub mod export;
pub mod in_memory;
pub mod ledger;
pub mod store;

// Re-export primary types for convenience
pub use error::{LedgerError, LedgerResult};
pub use event::{effective_decision, AuditEvent, AuditOverride, EvidenceRef};
pub use export::{ExportBundle, ExportMetadata, EXPORT_SCHEMA_VERSION};
pub use in_memory::{InMemoryEvidenceStore, InMemoryLedgerStore};
pub use ledger::{AuditLedger, EventContext, OverrideRequest};
pub use store::{EventFilter, LedgerStore, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
