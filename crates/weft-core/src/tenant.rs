// crates/weft-core/src/tenant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TenantId;

/// A federated capability. Partnerships enable these per direction;
/// tenants advertise them as capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FederationFeature {
    Members,
    Listings,
    Events,
    Groups,
    Messaging,
    Transactions,
}

/// The set of federation features enabled on one side of a relationship.
///
/// All flags default to off — federation is opt-in at every layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub members: bool,
    #[serde(default)]
    pub listings: bool,
    #[serde(default)]
    pub events: bool,
    #[serde(default)]
    pub groups: bool,
    #[serde(default)]
    pub messaging: bool,
    #[serde(default)]
    pub transactions: bool,
}

impl FeatureSet {
    /// A set with every feature enabled.
    pub fn all() -> Self {
        Self {
            members: true,
            listings: true,
            events: true,
            groups: true,
            messaging: true,
            transactions: true,
        }
    }

    /// A set with every feature disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the given feature is enabled in this set.
    pub fn enables(&self, feature: FederationFeature) -> bool {
        match feature {
            FederationFeature::Members => self.members,
            FederationFeature::Listings => self.listings,
            FederationFeature::Events => self.events,
            FederationFeature::Groups => self.groups,
            FederationFeature::Messaging => self.messaging,
            FederationFeature::Transactions => self.transactions,
        }
    }
}

/// One autonomous timebank community.
///
/// Immutable once onboarded, except for the capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: TenantId,
    /// Display name (e.g., "Hour Exchange Riverside").
    pub name: String,
    /// The tenant's domain, used to reach its federation endpoint.
    pub domain: String,
    /// Which federated features this tenant supports at all.
    pub features: FeatureSet,
}

/// Lifecycle of a partnership between two tenants.
///
///   Pending --> Active <--> Suspended
///                  |
///                  v
///              Terminated
///
/// Only `Active` partnerships are visible to the query router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    Active,
    Suspended,
    Terminated,
}

/// An agreed, feature-scoped data-sharing relationship between two tenants.
///
/// One row exists per unordered tenant pair (symmetric in existence), but
/// each side enables its own feature subset (asymmetric in flags):
/// `a_features` is what side A exposes to B, and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub a_tenant: TenantId,
    pub b_tenant: TenantId,
    pub status: PartnershipStatus,
    /// When the partnership became active.
    pub since: DateTime<Utc>,
    /// Features side A exposes to side B.
    pub a_features: FeatureSet,
    /// Features side B exposes to side A.
    pub b_features: FeatureSet,
}

impl Partnership {
    /// Normalized storage key for a tenant pair: (lower id, higher id).
    pub fn key(a: TenantId, b: TenantId) -> (TenantId, TenantId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Whether the given tenant is one of the two sides.
    pub fn involves(&self, tenant: TenantId) -> bool {
        self.a_tenant == tenant || self.b_tenant == tenant
    }

    /// The other side of the partnership, if `tenant` is a side.
    pub fn partner_of(&self, tenant: TenantId) -> Option<TenantId> {
        if self.a_tenant == tenant {
            Some(self.b_tenant)
        } else if self.b_tenant == tenant {
            Some(self.a_tenant)
        } else {
            None
        }
    }

    /// The feature set that `tenant` exposes to its partner.
    pub fn features_exposed_by(&self, tenant: TenantId) -> Option<&FeatureSet> {
        if self.a_tenant == tenant {
            Some(&self.a_features)
        } else if self.b_tenant == tenant {
            Some(&self.b_features)
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PartnershipStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_set_enables_matches_flags() {
        let set = FeatureSet {
            members: true,
            messaging: true,
            ..FeatureSet::none()
        };
        assert!(set.enables(FederationFeature::Members));
        assert!(set.enables(FederationFeature::Messaging));
        assert!(!set.enables(FederationFeature::Listings));
        assert!(!set.enables(FederationFeature::Transactions));
    }

    #[test]
    fn partnership_key_is_order_independent() {
        assert_eq!(Partnership::key(7, 3), Partnership::key(3, 7));
        assert_eq!(Partnership::key(3, 7), (3, 7));
    }

    #[test]
    fn partnership_sides_are_asymmetric() {
        let p = Partnership {
            a_tenant: 1,
            b_tenant: 2,
            status: PartnershipStatus::Active,
            since: Utc::now(),
            a_features: FeatureSet::all(),
            b_features: FeatureSet {
                members: true,
                ..FeatureSet::none()
            },
        };
        assert_eq!(p.partner_of(1), Some(2));
        assert_eq!(p.partner_of(2), Some(1));
        assert_eq!(p.partner_of(9), None);
        assert!(p.features_exposed_by(1).unwrap().transactions);
        assert!(!p.features_exposed_by(2).unwrap().transactions);
    }
}
