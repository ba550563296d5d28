//! Storage contract for the audit ledger.

use verdict_core::types::{Decision, EventId, RiskLevel, UserId};

use crate::error::LedgerResult;
use crate::event::{AuditEvent, AuditOverride};

/// Page size applied when a filter does not name one.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard ceiling on page size, regardless of what the filter asks for.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Selection criteria for event listings. Unset fields match everything.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    pub decision: Option<Decision>,
    pub risk_level: Option<RiskLevel>,
    pub user: Option<UserId>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            decision: None,
            risk_level: None,
            user: None,
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }
}

/// Persistence behind the audit ledger.
///
/// The store is append-only from the ledger's point of view: events and
/// overrides are inserted exactly once and never updated or deleted.
/// Signature verification is the ledger's job, not the store's.
pub trait LedgerStore: Send + Sync {
    /// Insert a new event. Inserting an id that already exists is a store
    /// failure, never an overwrite.
    fn insert_event(&self, event: &AuditEvent) -> LedgerResult<()>;

    /// Append an override. Same duplicate-id rule as events.
    fn insert_override(&self, record: &AuditOverride) -> LedgerResult<()>;

    fn event(&self, event_id: &EventId) -> LedgerResult<Option<AuditEvent>>;

    /// Matching events, newest first, with `offset` and `limit` applied
    /// after sorting.
    fn events(&self, filter: &EventFilter) -> LedgerResult<Vec<AuditEvent>>;

    /// Overrides attached to one event, ascending by timestamp.
    fn overrides_for(&self, event_id: &EventId) -> LedgerResult<Vec<AuditOverride>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the trait object is object-safe
    fn _assert_store_object_safe(_: &dyn LedgerStore) {}

    #[test]
    fn test_filter_default_page() {
        let filter = EventFilter::default();
        assert_eq!(filter.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(filter.offset, 0);
        assert!(filter.decision.is_none());
        assert!(filter.risk_level.is_none());
        assert!(filter.user.is_none());
    }
}
