//! In-memory implementations of the ledger store and evidence sideband.
//!
//! Useful for testing and for scenarios where persistence isn't needed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use verdict_core::error::{VerdictError, VerdictResult};
use verdict_core::traits::EvidenceStore;
use verdict_core::types::EventId;

use crate::error::{LedgerError, LedgerResult};
use crate::event::{AuditEvent, AuditOverride};
use crate::store::{EventFilter, LedgerStore};

// ---------------------------------------------------------------------------
// InMemoryLedgerStore
// ---------------------------------------------------------------------------

/// Ledger store backed by process memory.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    events: Mutex<HashMap<String, AuditEvent>>,
    overrides: Mutex<Vec<AuditOverride>>,
}

fn lock_events(
    mutex: &Mutex<HashMap<String, AuditEvent>>,
) -> LedgerResult<MutexGuard<'_, HashMap<String, AuditEvent>>> {
    mutex
        .lock()
        .map_err(|e| LedgerError::Store(format!("event lock poisoned: {}", e)))
}

fn lock_overrides(
    mutex: &Mutex<Vec<AuditOverride>>,
) -> LedgerResult<MutexGuard<'_, Vec<AuditOverride>>> {
    mutex
        .lock()
        .map_err(|e| LedgerError::Store(format!("override lock poisoned: {}", e)))
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            overrides: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of stored events.
    pub fn event_count(&self) -> usize {
        lock_events(&self.events).map(|e| e.len()).unwrap_or(0)
    }

    /// Get the number of stored overrides.
    pub fn override_count(&self) -> usize {
        lock_overrides(&self.overrides).map(|o| o.len()).unwrap_or(0)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn insert_event(&self, event: &AuditEvent) -> LedgerResult<()> {
        let mut events = lock_events(&self.events)?;
        if events.contains_key(event.event_id.as_str()) {
            return Err(LedgerError::Store(format!(
                "duplicate event id: {}",
                event.event_id
            )));
        }
        events.insert(event.event_id.as_str().to_string(), event.clone());
        Ok(())
    }

    fn insert_override(&self, record: &AuditOverride) -> LedgerResult<()> {
        let mut overrides = lock_overrides(&self.overrides)?;
        if overrides
            .iter()
            .any(|o| o.override_id == record.override_id)
        {
            return Err(LedgerError::Store(format!(
                "duplicate override id: {}",
                record.override_id
            )));
        }
        overrides.push(record.clone());
        Ok(())
    }

    fn event(&self, event_id: &EventId) -> LedgerResult<Option<AuditEvent>> {
        let events = lock_events(&self.events)?;
        Ok(events.get(event_id.as_str()).cloned())
    }

    fn events(&self, filter: &EventFilter) -> LedgerResult<Vec<AuditEvent>> {
        let events = lock_events(&self.events)?;
        let mut matched: Vec<AuditEvent> = events
            .values()
            .filter(|event| {
                filter.decision.map_or(true, |d| event.decision == d)
                    && filter.risk_level.map_or(true, |r| event.risk_level == r)
                    && filter
                        .user
                        .as_ref()
                        .map_or(true, |u| &event.user == u)
            })
            .cloned()
            .collect();

        // Newest first; ties broken by id so paging is stable.
        matched.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.event_id.as_str().cmp(a.event_id.as_str()))
        });

        Ok(matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    fn overrides_for(&self, event_id: &EventId) -> LedgerResult<Vec<AuditOverride>> {
        let overrides = lock_overrides(&self.overrides)?;
        let mut matched: Vec<AuditOverride> = overrides
            .iter()
            .filter(|o| &o.original_event_id == event_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.override_id.as_str().cmp(b.override_id.as_str()))
        });
        Ok(matched)
    }
}

// ---------------------------------------------------------------------------
// InMemoryEvidenceStore
// ---------------------------------------------------------------------------

/// Evidence sideband backed by process memory. The timeout parameter is
/// accepted for contract parity and ignored; memory writes cannot stall.
#[derive(Default)]
pub struct InMemoryEvidenceStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

fn lock_blobs(
    mutex: &Mutex<HashMap<String, Vec<u8>>>,
) -> VerdictResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
    mutex
        .lock()
        .map_err(|e| VerdictError::Evidence(format!("blob lock poisoned: {}", e)))
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Get all stored keys (for testing/inspection).
    pub fn keys(&self) -> Vec<String> {
        lock_blobs(&self.blobs)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the number of stored blobs.
    pub fn count(&self) -> usize {
        lock_blobs(&self.blobs).map(|b| b.len()).unwrap_or(0)
    }
}

impl EvidenceStore for InMemoryEvidenceStore {
    fn put(&self, key: &str, payload: &[u8], _timeout: Duration) -> VerdictResult<()> {
        let mut blobs = lock_blobs(&self.blobs)?;
        blobs.insert(key.to_string(), payload.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> VerdictResult<Option<Vec<u8>>> {
        let blobs = lock_blobs(&self.blobs)?;
        Ok(blobs.get(key).cloned())
    }
}
