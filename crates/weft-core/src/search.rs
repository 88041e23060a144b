// crates/weft-core/src/search.rs
//
// Search inputs shared by the query router and the tenant-client interface.
// Tenant-local filtering is pushed down to each tenant, so these filters
// travel across the wire as part of a partner query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::member::ServiceReach;
use crate::resource::ListingKind;
use crate::TenantId;

/// Filters for a federated search. All fields are optional; an empty
/// filter set matches everything the viewer is entitled to see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free-text query, matched case-insensitively against names, titles,
    /// bios, and descriptions.
    #[serde(default)]
    pub query: Option<String>,
    /// Restrict results to a single partner tenant.
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    /// Listing/event category.
    #[serde(default)]
    pub category: Option<String>,
    /// Offer vs request, for listings.
    #[serde(default)]
    pub listing_kind: Option<ListingKind>,
    /// Skills to match. A member matches if any requested skill is present
    /// in their skill set (OR semantics).
    #[serde(default)]
    pub skills: Vec<String>,
    /// Location substring, matched case-insensitively.
    #[serde(default)]
    pub location: Option<String>,
    /// Minimum service reach: `WillTravel` also matches `RemoteOk`.
    #[serde(default)]
    pub service_reach: Option<ServiceReach>,
    /// Only members reachable by cross-tenant messaging.
    #[serde(default)]
    pub require_messaging: bool,
    /// Only members open to cross-tenant transactions.
    #[serde(default)]
    pub require_transactions: bool,
    /// Time window for events.
    #[serde(default)]
    pub starts_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub starts_before: Option<DateTime<Utc>>,
}

/// Offset/limit pagination cursor. Each paginated call is a complete,
/// independent re-query — no server-held session state exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageCursor {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "PageCursor::default_limit")]
    pub limit: usize,
}

impl PageCursor {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    fn default_limit() -> usize {
        Self::DEFAULT_LIMIT
    }

    /// Clamp the limit into [1, MAX_LIMIT].
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Primary sort field for a federated search. Resource-dependent: kinds
/// without the sorted-on attribute fall back to name order. Ties always
/// break on `(tenant_id, record_id)` so ordering is deterministic across
/// successive paginated calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Name,
    Recent,
    Active,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_clamps_limit() {
        assert_eq!(PageCursor { offset: 0, limit: 0 }.clamped().limit, 1);
        assert_eq!(
            PageCursor {
                offset: 0,
                limit: 5000
            }
            .clamped()
            .limit,
            PageCursor::MAX_LIMIT
        );
        assert_eq!(PageCursor::default().limit, PageCursor::DEFAULT_LIMIT);
    }
}
