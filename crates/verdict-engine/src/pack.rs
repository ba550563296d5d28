//! Policy packs: versioned bundles of tags the engine evaluates against.
//!
//! A pack names the tags producers may emit, each with a risk level and
//! the enforcement action that risk maps to. Packs are loaded from JSON,
//! validated structurally before use, and swapped atomically through a
//! [`PackStore`].

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use verdict_core::types::{Decision, PackVersion, RiskLevel};

use crate::error::{EngineError, EngineResult};

/// Version stamped on decisions made while no pack is active.
pub const FALLBACK_PACK_VERSION: &str = "fallback";

/// Upper bound on pack payloads accepted by [`load_pack`].
const MAX_PACK_SIZE: usize = 1024 * 1024;

/// Longest tag name accepted by validation, in bytes.
const MAX_TAG_NAME_LEN: usize = 100;

/// The [`PackVersion`] used when no pack is active.
pub fn fallback_version() -> PackVersion {
    PackVersion::new(FALLBACK_PACK_VERSION)
}

// ---------------------------------------------------------------------------
// Pack types
// ---------------------------------------------------------------------------

/// One tag a policy pack can apply to an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyTag {
    /// Stable identifier producers emit, e.g. `biometric_identification`.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Risk level this tag carries when matched.
    pub risk_level: RiskLevel,
    /// Literal fragments the pattern producer scans for. May be empty for
    /// tags only the vision or classifier producers can assign.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Enforcement action this tag maps to on its own.
    pub action: Decision,
}

/// A versioned bundle of policy tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyPack {
    pub name: String,
    pub version: PackVersion,
    #[serde(default)]
    pub description: String,
    /// Whether this pack is the one evaluations run against.
    #[serde(default)]
    pub active: bool,
    pub tags: Vec<PolicyTag>,
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

/// Load a PolicyPack from raw JSON bytes.
pub fn load_pack(pack_data: &[u8]) -> EngineResult<PolicyPack> {
    if pack_data.is_empty() {
        return Err(EngineError::PackLoad("pack data is empty".to_string()));
    }
    if pack_data.len() > MAX_PACK_SIZE {
        return Err(EngineError::PackLoad(
            "pack data exceeds 1MB size limit".to_string(),
        ));
    }

    let json_str = std::str::from_utf8(pack_data)
        .map_err(|_| EngineError::PackLoad("pack data is not valid UTF-8".to_string()))?;

    let pack: PolicyPack = serde_json::from_str(json_str)
        .map_err(|e| EngineError::Deserialization(format!("JSON parse error: {}", e)))?;

    if let Err(errors) = validate_pack(&pack) {
        return Err(EngineError::Validation(errors.join("; ")));
    }

    Ok(pack)
}

/// Serialize a PolicyPack to JSON bytes for storage.
pub fn save_pack(pack: &PolicyPack) -> EngineResult<Vec<u8>> {
    if let Err(errors) = validate_pack(pack) {
        return Err(EngineError::Validation(errors.join("; ")));
    }

    serde_json::to_vec_pretty(pack)
        .map_err(|e| EngineError::Serialization(format!("JSON serialize error: {}", e)))
}

/// Validate a PolicyPack for structural integrity.
///
/// Checks:
/// - Pack name and version are non-empty
/// - At least one tag exists
/// - All tag names are unique, non-empty, and within length bounds
/// - No pattern entry is blank
pub fn validate_pack(pack: &PolicyPack) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if pack.name.is_empty() {
        errors.push("pack name must not be empty".to_string());
    }

    if pack.version.as_str().is_empty() {
        errors.push("pack version must not be empty".to_string());
    }

    if pack.tags.is_empty() {
        errors.push("pack must contain at least one tag".to_string());
    }

    let mut seen_names = HashSet::new();
    for tag in &pack.tags {
        if tag.name.is_empty() {
            errors.push("tag name must not be empty".to_string());
        } else if tag.name.len() > MAX_TAG_NAME_LEN {
            // Truncate on char boundaries; a byte-index slice would panic
            // on multi-byte names.
            let prefix: String = tag.name.chars().take(20).collect();
            errors.push(format!(
                "tag name '{}...' exceeds {} bytes",
                prefix, MAX_TAG_NAME_LEN
            ));
        } else if !seen_names.insert(&tag.name) {
            errors.push(format!("duplicate tag name: '{}'", tag.name));
        }

        if tag.patterns.iter().any(|pattern| pattern.is_empty()) {
            errors.push(format!("tag '{}': patterns must not be blank", tag.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// PackStore — active pack lookup
// ---------------------------------------------------------------------------

/// Source of the pack evaluations run against.
///
/// Implementations must resolve the active pack fresh on every call so a
/// pack swap takes effect without restarting in-flight services.
pub trait PackStore: Send + Sync {
    /// Returns the currently active pack, if any.
    fn active(&self) -> Option<PolicyPack>;
}

/// In-memory pack store.
///
/// Useful for testing and for scenarios where packs are loaded once at
/// startup rather than managed externally.
#[derive(Default)]
pub struct InMemoryPackStore {
    packs: Mutex<Vec<PolicyPack>>,
}

fn lock_packs(mutex: &Mutex<Vec<PolicyPack>>) -> EngineResult<MutexGuard<'_, Vec<PolicyPack>>> {
    mutex
        .lock()
        .map_err(|e| EngineError::Store(format!("lock poisoned: {}", e)))
}

impl InMemoryPackStore {
    pub fn new() -> Self {
        Self {
            packs: Mutex::new(Vec::new()),
        }
    }

    /// Inserts a validated pack, replacing any stored pack with the same
    /// version.
    pub fn insert(&self, pack: PolicyPack) -> EngineResult<()> {
        if let Err(errors) = validate_pack(&pack) {
            return Err(EngineError::Validation(errors.join("; ")));
        }

        let mut packs = lock_packs(&self.packs)?;
        if let Some(existing) = packs.iter_mut().find(|p| p.version == pack.version) {
            *existing = pack;
        } else {
            packs.push(pack);
        }
        Ok(())
    }

    /// Marks the pack with `version` active and deactivates every other
    /// pack, keeping at most one pack active. Returns false when no pack
    /// with that version is stored.
    pub fn set_active(&self, version: &PackVersion) -> EngineResult<bool> {
        let mut packs = lock_packs(&self.packs)?;
        if !packs.iter().any(|p| &p.version == version) {
            return Ok(false);
        }
        for pack in packs.iter_mut() {
            pack.active = &pack.version == version;
        }
        Ok(true)
    }

    /// Get the number of stored packs.
    pub fn count(&self) -> usize {
        lock_packs(&self.packs).map(|p| p.len()).unwrap_or(0)
    }

    /// Get all stored pack versions (for testing/inspection).
    pub fn versions(&self) -> Vec<PackVersion> {
        lock_packs(&self.packs)
            .map(|p| p.iter().map(|pack| pack.version.clone()).collect())
            .unwrap_or_default()
    }
}

impl PackStore for InMemoryPackStore {
    fn active(&self) -> Option<PolicyPack> {
        let packs = lock_packs(&self.packs).ok()?;
        packs.iter().find(|p| p.active).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tag(name: &str, risk_level: RiskLevel, action: Decision) -> PolicyTag {
        PolicyTag {
            name: name.to_string(),
            description: String::new(),
            risk_level,
            patterns: vec!["facial recognition".to_string()],
            action,
        }
    }

    fn make_pack(version: &str) -> PolicyPack {
        PolicyPack {
            name: "eu-ai-act-baseline".to_string(),
            version: PackVersion::new(version),
            description: "Baseline prohibited and high-risk practices".to_string(),
            active: false,
            tags: vec![
                make_tag("biometric_identification", RiskLevel::High, Decision::Flag),
                make_tag("social_scoring", RiskLevel::Unacceptable, Decision::Block),
            ],
        }
    }

    fn _assert_pack_store_object_safe(_: &dyn PackStore) {}

    #[test]
    fn test_load_pack_valid() {
        let bytes = serde_json::to_vec(&make_pack("2024.06")).unwrap();
        let pack = load_pack(&bytes).unwrap();
        assert_eq!(pack.version, PackVersion::new("2024.06"));
        assert_eq!(pack.tags.len(), 2);
    }

    #[test]
    fn test_load_pack_empty_data() {
        let result = load_pack(&[]);
        assert!(matches!(result, Err(EngineError::PackLoad(_))));
    }

    #[test]
    fn test_load_pack_oversized() {
        let data = vec![b' '; MAX_PACK_SIZE + 1];
        let result = load_pack(&data);
        assert!(matches!(result, Err(EngineError::PackLoad(_))));
    }

    #[test]
    fn test_load_pack_invalid_utf8() {
        let result = load_pack(&[0xff, 0xfe, 0xfd]);
        assert!(matches!(result, Err(EngineError::PackLoad(_))));
    }

    #[test]
    fn test_load_pack_malformed_json() {
        let result = load_pack(b"{not json");
        assert!(matches!(result, Err(EngineError::Deserialization(_))));
    }

    #[test]
    fn test_load_pack_rejects_invalid_pack() {
        let mut pack = make_pack("2024.06");
        pack.tags.clear();
        let bytes = serde_json::to_vec(&pack).unwrap();
        let err = load_pack(&bytes).unwrap_err();
        assert!(err.to_string().contains("at least one tag"));
    }

    #[test]
    fn test_save_pack_round_trip() {
        let pack = make_pack("2024.06");
        let bytes = save_pack(&pack).unwrap();
        let back = load_pack(&bytes).unwrap();
        assert_eq!(back, pack);
    }

    #[test]
    fn test_validate_pack_duplicate_tag_names() {
        let mut pack = make_pack("2024.06");
        pack.tags
            .push(make_tag("social_scoring", RiskLevel::High, Decision::Flag));
        let errors = validate_pack(&pack).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("duplicate tag name")));
    }

    #[test]
    fn test_validate_pack_empty_tag_name() {
        let mut pack = make_pack("2024.06");
        pack.tags[0].name.clear();
        let errors = validate_pack(&pack).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("tag name must not be empty")));
    }

    #[test]
    fn test_validate_pack_overlong_tag_name() {
        let mut pack = make_pack("2024.06");
        pack.tags[0].name = "x".repeat(MAX_TAG_NAME_LEN + 1);
        let errors = validate_pack(&pack).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("exceeds 100 bytes")));
    }

    #[test]
    fn test_validate_pack_overlong_multibyte_tag_name() {
        // 34 euro signs = 102 bytes, and byte index 20 falls inside a
        // character. Validation must report the error, not panic.
        let mut pack = make_pack("2024.06");
        pack.tags[0].name = "\u{20ac}".repeat(34);
        let errors = validate_pack(&pack).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("exceeds 100 bytes")));

        let bytes = serde_json::to_vec(&pack).unwrap();
        assert!(matches!(load_pack(&bytes), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_validate_pack_blank_pattern() {
        let mut pack = make_pack("2024.06");
        pack.tags[0].patterns.push(String::new());
        let errors = validate_pack(&pack).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("patterns must not be blank")));
    }

    #[test]
    fn test_validate_pack_collects_multiple_errors() {
        let pack = PolicyPack {
            name: String::new(),
            version: PackVersion::new(""),
            description: String::new(),
            active: false,
            tags: Vec::new(),
        };
        let errors = validate_pack(&pack).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_store_active_none_when_empty() {
        let store = InMemoryPackStore::new();
        assert!(store.active().is_none());
    }

    #[test]
    fn test_store_set_active_switches_packs() {
        let store = InMemoryPackStore::new();
        store.insert(make_pack("2024.06")).unwrap();
        store.insert(make_pack("2025.01")).unwrap();

        assert!(store.set_active(&PackVersion::new("2024.06")).unwrap());
        let active = store.active().unwrap();
        assert_eq!(active.version, PackVersion::new("2024.06"));

        assert!(store.set_active(&PackVersion::new("2025.01")).unwrap());
        let active = store.active().unwrap();
        assert_eq!(active.version, PackVersion::new("2025.01"));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_store_set_active_unknown_version() {
        let store = InMemoryPackStore::new();
        store.insert(make_pack("2024.06")).unwrap();
        assert!(!store.set_active(&PackVersion::new("1999.01")).unwrap());
        assert!(store.active().is_none());
    }

    #[test]
    fn test_store_insert_replaces_same_version() {
        let store = InMemoryPackStore::new();
        store.insert(make_pack("2024.06")).unwrap();

        let mut updated = make_pack("2024.06");
        updated.name = "eu-ai-act-amended".to_string();
        store.insert(updated).unwrap();

        assert_eq!(store.count(), 1);
        store.set_active(&PackVersion::new("2024.06")).unwrap();
        assert_eq!(store.active().unwrap().name, "eu-ai-act-amended");
    }

    #[test]
    fn test_store_insert_rejects_invalid_pack() {
        let store = InMemoryPackStore::new();
        let mut pack = make_pack("2024.06");
        pack.tags.clear();
        assert!(matches!(
            store.insert(pack),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_fallback_version() {
        assert_eq!(fallback_version().as_str(), "fallback");
    }
}
