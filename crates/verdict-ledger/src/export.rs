//! Verifiable export bundles for external audits.

use serde::{Deserialize, Serialize};
use verdict_core::signer::Signer;
use verdict_core::types::Timestamp;

use crate::error::{LedgerError, LedgerResult};
use crate::event::{AuditEvent, AuditOverride};

/// Bundle layout version, bumped on any breaking change to the export
/// shape so downstream auditors can dispatch on it.
pub const EXPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub exported_at: Timestamp,
    pub schema_version: String,
}

/// One event and its full override history, carrying the signatures
/// exactly as stored. The bundle is self-contained: anyone holding the
/// signing secret can re-verify it long after export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub audit_event: AuditEvent,
    pub overrides: Vec<AuditOverride>,
    pub metadata: ExportMetadata,
}

impl ExportBundle {
    /// Re-verify every signature in the bundle.
    pub fn verify(&self, signer: &Signer) -> LedgerResult<()> {
        let bytes = self.audit_event.signable_record().to_bytes()?;
        if !signer.verify(&bytes, &self.audit_event.signature) {
            return Err(LedgerError::Integrity(format!(
                "exported event '{}' failed signature verification",
                self.audit_event.event_id
            )));
        }

        for record in &self.overrides {
            let bytes = record.signable_record().to_bytes()?;
            if !signer.verify(&bytes, &record.signature) {
                return Err(LedgerError::Integrity(format!(
                    "exported override '{}' failed signature verification",
                    record.override_id
                )));
            }
        }

        Ok(())
    }
}
