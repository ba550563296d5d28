//! Audit records: the signed event sealed at decision time and the
//! append-only overrides operators attach to it afterwards.

use serde::{Deserialize, Serialize};
use verdict_core::canonical::CanonicalRecord;
use verdict_core::types::{
    ClientId, Decision, EventId, InputKind, OverrideId, PackVersion, RiskLevel, SignalSource,
    Timestamp, UserId,
};

// ---------------------------------------------------------------------------
// EvidenceRef — pointer into the evidence sideband
// ---------------------------------------------------------------------------

/// Where one producer's raw evidence ended up. Evidence writes are
/// best-effort: a failed write becomes a `StorageFailed` marker instead of
/// failing the evaluation, so the record always says what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceRef {
    /// Evidence is stored in the sideband under this key.
    Stored(String),
    /// The sideband write failed; only this marker remains.
    StorageFailed { source: SignalSource },
}

// ---------------------------------------------------------------------------
// AuditEvent — one sealed evaluation
// ---------------------------------------------------------------------------

/// The permanent record of one evaluation. Written exactly once; never
/// updated in place. Later corrections arrive as [`AuditOverride`] rows
/// that reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: EventId,
    pub timestamp: Timestamp,
    /// SHA-256 hex digest of the submitted content. The ledger never
    /// stores the content itself.
    pub input_hash: String,
    pub input_type: InputKind,
    pub user: UserId,
    pub client_id: ClientId,
    pub decision: Decision,
    pub risk_level: RiskLevel,
    pub policy_tags: Vec<String>,
    pub policy_version: PackVersion,
    pub confidence_score: u8,
    pub explanation: String,
    pub evidence_refs: Vec<EvidenceRef>,
    /// `hmac-sha256:<hex>` over [`signable_record`](Self::signable_record).
    pub signature: String,
}

impl AuditEvent {
    /// The canonical subset of fields covered by the signature.
    ///
    /// Covered: event_id, timestamp, input_hash, user, client_id, decision,
    /// policy_tags, risk_level, policy_version.
    ///
    /// Outside the envelope: evidence_refs (a sideband write failure must
    /// not change what was decided), explanation and confidence_score
    /// (advisory text, not the decision itself), and input_type.
    pub fn signable_record(&self) -> CanonicalRecord {
        CanonicalRecord::new()
            .text("event_id", self.event_id.as_str())
            .timestamp("timestamp", &self.timestamp)
            .text("input_hash", &self.input_hash)
            .text("user", self.user.as_str())
            .text("client_id", self.client_id.as_str())
            .text("decision", &self.decision.to_string())
            .text_list("policy_tags", &self.policy_tags)
            .text("risk_level", &self.risk_level.to_string())
            .text("policy_version", self.policy_version.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditOverride — operator correction, append-only
// ---------------------------------------------------------------------------

/// A human operator's correction to a sealed event. The event itself is
/// untouched; readers project the effective decision at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOverride {
    pub override_id: OverrideId,
    pub original_event_id: EventId,
    pub timestamp: Timestamp,
    pub operator: UserId,
    pub new_decision: Decision,
    pub reason: String,
    /// Lifetime of the override in minutes. `None` means permanent.
    pub duration_minutes: Option<u32>,
    /// `hmac-sha256:<hex>` over [`signable_record`](Self::signable_record).
    pub signature: String,
}

impl AuditOverride {
    /// The canonical subset of fields covered by the signature.
    ///
    /// Covered: override_id, original_event_id, timestamp, operator,
    /// new_decision, reason, duration. A permanent override signs an
    /// explicit null duration, so adding a duration later is detectable.
    pub fn signable_record(&self) -> CanonicalRecord {
        CanonicalRecord::new()
            .text("override_id", self.override_id.as_str())
            .text("original_event_id", self.original_event_id.as_str())
            .timestamp("timestamp", &self.timestamp)
            .text("operator", self.operator.as_str())
            .text("new_decision", &self.new_decision.to_string())
            .text("reason", &self.reason)
            .optional_int("duration", self.duration_minutes.map(i64::from))
    }

    /// When this override lapses, or `None` for a permanent override.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.duration_minutes.map(|minutes| {
            Timestamp::from_seconds(
                self.timestamp
                    .seconds_since_epoch
                    .saturating_add(u64::from(minutes) * 60),
            )
        })
    }

    /// An override is expired from its expiry instant onwards.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        match self.expires_at() {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}

/// Decision in force at `now`: the latest unexpired override wins, falling
/// back to the decision sealed in the event. `overrides` must be in
/// ascending creation order, as returned by the ledger.
pub fn effective_decision(
    event: &AuditEvent,
    overrides: &[AuditOverride],
    now: Timestamp,
) -> Decision {
    overrides
        .iter()
        .rev()
        .find(|record| !record.is_expired_at(now))
        .map(|record| record.new_decision)
        .unwrap_or(event.decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event() -> AuditEvent {
        AuditEvent {
            event_id: EventId::new("evt-20231114-aabbccdd00112233"),
            timestamp: Timestamp::from_seconds(1_700_000_000),
            input_hash: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
                .to_string(),
            input_type: InputKind::Text,
            user: UserId::new("alice"),
            client_id: ClientId::new("mobile-app"),
            decision: Decision::Flag,
            risk_level: RiskLevel::High,
            policy_tags: vec!["biometric_identification".to_string()],
            policy_version: PackVersion::new("2024.06"),
            confidence_score: 90,
            explanation: "matched biometric pattern".to_string(),
            evidence_refs: vec![EvidenceRef::Stored(
                "evidence/evt-20231114-aabbccdd00112233/pattern.json".to_string(),
            )],
            signature: String::new(),
        }
    }

    fn make_override(duration_minutes: Option<u32>) -> AuditOverride {
        AuditOverride {
            override_id: OverrideId::new("ovr-20231115-1122334455667788"),
            original_event_id: EventId::new("evt-20231114-aabbccdd00112233"),
            timestamp: Timestamp::from_seconds(1_700_086_400),
            operator: UserId::new("compliance-officer"),
            new_decision: Decision::Allow,
            reason: "false positive, reviewed manually".to_string(),
            duration_minutes,
            signature: String::new(),
        }
    }

    #[test]
    fn test_event_signable_covers_exactly_nine_fields() {
        let record = make_event().signable_record();
        assert_eq!(
            record.field_names(),
            vec![
                "client_id",
                "decision",
                "event_id",
                "input_hash",
                "policy_tags",
                "policy_version",
                "risk_level",
                "timestamp",
                "user",
            ]
        );
    }

    #[test]
    fn test_event_signable_excludes_advisory_fields() {
        let names = make_event().signable_record().field_names().join(",");
        assert!(!names.contains("explanation"));
        assert!(!names.contains("confidence_score"));
        assert!(!names.contains("evidence_refs"));
        assert!(!names.contains("signature"));
    }

    #[test]
    fn test_event_signable_bytes_unaffected_by_unsigned_fields() {
        let event = make_event();
        let mut relabeled = event.clone();
        relabeled.explanation = "different wording".to_string();
        relabeled.confidence_score = 10;
        relabeled.evidence_refs.clear();
        assert_eq!(
            event.signable_record().to_bytes().unwrap(),
            relabeled.signable_record().to_bytes().unwrap()
        );
    }

    #[test]
    fn test_event_signable_changes_with_signed_fields() {
        let event = make_event();
        let mut tampered = event.clone();
        tampered.decision = Decision::Allow;
        assert_ne!(
            event.signable_record().to_bytes().unwrap(),
            tampered.signable_record().to_bytes().unwrap()
        );
    }

    #[test]
    fn test_override_signable_covers_exactly_seven_fields() {
        let record = make_override(Some(60)).signable_record();
        assert_eq!(
            record.field_names(),
            vec![
                "duration",
                "new_decision",
                "operator",
                "original_event_id",
                "override_id",
                "reason",
                "timestamp",
            ]
        );
    }

    #[test]
    fn test_override_signable_permanent_signs_null_duration() {
        let permanent = make_override(None).signable_record().to_bytes().unwrap();
        let bounded = make_override(Some(60)).signable_record().to_bytes().unwrap();
        let text = String::from_utf8(permanent).unwrap();
        assert!(text.contains(r#""duration":null"#));
        assert_ne!(text.as_bytes(), bounded.as_slice());
    }

    #[test]
    fn test_override_expiry_boundary() {
        let record = make_override(Some(30));
        let expiry = record.expires_at().unwrap();
        assert_eq!(
            expiry.seconds_since_epoch,
            record.timestamp.seconds_since_epoch + 30 * 60
        );

        let just_before = Timestamp::from_seconds(expiry.seconds_since_epoch - 1);
        assert!(!record.is_expired_at(just_before));
        assert!(record.is_expired_at(expiry));
    }

    #[test]
    fn test_override_permanent_never_expires() {
        let record = make_override(None);
        assert!(record.expires_at().is_none());
        assert!(!record.is_expired_at(Timestamp::from_seconds(u64::MAX)));
    }

    #[test]
    fn test_effective_decision_latest_unexpired_wins() {
        let event = make_event();
        let mut first = make_override(None);
        first.new_decision = Decision::Block;
        let mut second = make_override(None);
        second.override_id = OverrideId::new("ovr-20231116-99aabbccddeeff00");
        second.timestamp = Timestamp::from_seconds(1_700_172_800);
        second.new_decision = Decision::Allow;

        let now = Timestamp::from_seconds(1_700_200_000);
        assert_eq!(
            effective_decision(&event, &[first, second], now),
            Decision::Allow
        );
    }

    #[test]
    fn test_effective_decision_skips_expired() {
        let event = make_event();
        let expired = make_override(Some(1));
        let now = Timestamp::from_seconds(expired.timestamp.seconds_since_epoch + 3600);
        // The only override has lapsed; the sealed decision stands.
        assert_eq!(effective_decision(&event, &[expired], now), event.decision);
    }

    #[test]
    fn test_effective_decision_no_overrides() {
        let event = make_event();
        let now = Timestamp::from_seconds(1_700_200_000);
        assert_eq!(effective_decision(&event, &[], now), Decision::Flag);
    }

    #[test]
    fn test_evidence_ref_serde() {
        let stored = EvidenceRef::Stored("evidence/evt-x/pattern.json".to_string());
        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(json, r#"{"stored":"evidence/evt-x/pattern.json"}"#);

        let failed = EvidenceRef::StorageFailed {
            source: SignalSource::Vision,
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"storage_failed":{"source":"vision"}}"#);
    }
}
