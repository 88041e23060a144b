// crates/weft-core/src/resource.rs
//
// Federated resource projections and the closed record enum the router
// merges over. The four resource kinds are fixed and exhaustively handled
// everywhere (merging, filtering, stats), so a tagged enum is used rather
// than open-ended dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::member::FederatedMember;
use crate::tenant::FederationFeature;
use crate::{RecordId, TenantId};

/// The four federated resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Member,
    Listing,
    Event,
    Group,
}

impl ResourceKind {
    /// The partnership feature that must be enabled for this resource kind
    /// to cross a tenant boundary.
    pub fn required_feature(self) -> FederationFeature {
        match self {
            ResourceKind::Member => FederationFeature::Members,
            ResourceKind::Listing => FederationFeature::Listings,
            ResourceKind::Event => FederationFeature::Events,
            ResourceKind::Group => FederationFeature::Groups,
        }
    }
}

/// Whether a listing offers a service or requests one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Offer,
    Request,
}

/// A service listing as seen across a tenant boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedListing {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub title: String,
    pub kind: ListingKind,
    pub category: String,
    pub description: String,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A community event as seen across a tenant boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedEvent {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub attendee_count: u32,
}

/// A group as seen across a tenant boundary. Groups that do not accept
/// members from partner tenants are dropped from federated results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedGroup {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub member_count: u32,
    pub open_to_partners: bool,
    pub last_active_at: DateTime<Utc>,
}

/// One record in a merged federated result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FederatedRecord {
    Member(FederatedMember),
    Listing(FederatedListing),
    Event(FederatedEvent),
    Group(FederatedGroup),
}

impl FederatedRecord {
    pub fn kind(&self) -> ResourceKind {
        match self {
            FederatedRecord::Member(_) => ResourceKind::Member,
            FederatedRecord::Listing(_) => ResourceKind::Listing,
            FederatedRecord::Event(_) => ResourceKind::Event,
            FederatedRecord::Group(_) => ResourceKind::Group,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        match self {
            FederatedRecord::Member(m) => m.tenant_id,
            FederatedRecord::Listing(l) => l.tenant_id,
            FederatedRecord::Event(e) => e.tenant_id,
            FederatedRecord::Group(g) => g.tenant_id,
        }
    }

    pub fn record_id(&self) -> RecordId {
        match self {
            FederatedRecord::Member(m) => m.id,
            FederatedRecord::Listing(l) => l.id,
            FederatedRecord::Event(e) => e.id,
            FederatedRecord::Group(g) => g.id,
        }
    }

    /// The name the record sorts under for name ordering.
    pub fn display_name(&self) -> &str {
        match self {
            FederatedRecord::Member(m) => &m.name,
            FederatedRecord::Listing(l) => &l.title,
            FederatedRecord::Event(e) => &e.title,
            FederatedRecord::Group(g) => &g.name,
        }
    }

    /// The timestamp the record sorts under for recency ordering.
    /// Members carry no cross-tenant timestamp and fall back to name order.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        match self {
            FederatedRecord::Member(_) => None,
            FederatedRecord::Listing(l) => Some(l.created_at),
            FederatedRecord::Event(e) => Some(e.starts_at),
            FederatedRecord::Group(g) => Some(g.last_active_at),
        }
    }

    /// The magnitude the record sorts under for activity ordering:
    /// attendee count for events, member count for groups. Members and
    /// listings have no activity measure and fall back to name order.
    pub fn activity(&self) -> Option<u32> {
        match self {
            FederatedRecord::Member(_) => None,
            FederatedRecord::Listing(_) => None,
            FederatedRecord::Event(e) => Some(e.attendee_count),
            FederatedRecord::Group(g) => Some(g.member_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_feature_per_kind() {
        assert_eq!(
            ResourceKind::Member.required_feature(),
            FederationFeature::Members
        );
        assert_eq!(
            ResourceKind::Listing.required_feature(),
            FederationFeature::Listings
        );
        assert_eq!(
            ResourceKind::Event.required_feature(),
            FederationFeature::Events
        );
        assert_eq!(
            ResourceKind::Group.required_feature(),
            FederationFeature::Groups
        );
    }
}
