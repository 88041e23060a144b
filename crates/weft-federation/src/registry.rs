// crates/weft-federation/src/registry.rs
//
// TenantPartnershipRegistry: which tenants exist, which pairs have an
// active partnership, and which features each side has enabled.
//
// Pure lookup layer. The maps are loaded at assembly time from persisted
// partnership rows; only `Active` partnerships are ever visible to the
// query router.

use std::collections::HashMap;
use std::sync::RwLock;

use weft_core::{
    FederationFeature, Partnership, PartnershipStatus, Tenant, TenantId, WeftError,
};

fn poisoned(e: impl std::fmt::Display) -> WeftError {
    WeftError::Store(format!("RwLock poisoned: {}", e))
}

/// Registry of tenants and the partnerships between them.
#[derive(Debug, Default)]
pub struct TenantPartnershipRegistry {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
    partnerships: RwLock<HashMap<(TenantId, TenantId), Partnership>>,
}

impl TenantPartnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant (or replace its capability flags).
    pub fn register_tenant(&self, tenant: Tenant) -> Result<(), WeftError> {
        let mut tenants = self.tenants.write().map_err(poisoned)?;
        tenants.insert(tenant.id, tenant);
        Ok(())
    }

    /// Look up a tenant by id.
    pub fn tenant(&self, id: TenantId) -> Result<Tenant, WeftError> {
        let tenants = self.tenants.read().map_err(poisoned)?;
        tenants
            .get(&id)
            .cloned()
            .ok_or_else(|| WeftError::NotFound(format!("tenant {}", id)))
    }

    /// Insert or replace the partnership for a tenant pair. Both tenants
    /// must already be registered.
    pub fn upsert_partnership(&self, partnership: Partnership) -> Result<(), WeftError> {
        {
            let tenants = self.tenants.read().map_err(poisoned)?;
            for side in [partnership.a_tenant, partnership.b_tenant] {
                if !tenants.contains_key(&side) {
                    return Err(WeftError::NotFound(format!("tenant {}", side)));
                }
            }
        }
        let key = Partnership::key(partnership.a_tenant, partnership.b_tenant);
        let mut partnerships = self.partnerships.write().map_err(poisoned)?;
        partnerships.insert(key, partnership);
        Ok(())
    }

    /// Change the status of an existing partnership (suspend, reactivate,
    /// terminate).
    pub fn set_partnership_status(
        &self,
        a: TenantId,
        b: TenantId,
        status: PartnershipStatus,
    ) -> Result<(), WeftError> {
        let mut partnerships = self.partnerships.write().map_err(poisoned)?;
        match partnerships.get_mut(&Partnership::key(a, b)) {
            Some(p) => {
                p.status = status;
                Ok(())
            }
            None => Err(WeftError::NotFound(format!(
                "partnership between {} and {}",
                a, b
            ))),
        }
    }

    /// The partnership between two tenants, in either order, any status.
    pub fn partnership_between(
        &self,
        a: TenantId,
        b: TenantId,
    ) -> Result<Option<Partnership>, WeftError> {
        let partnerships = self.partnerships.read().map_err(poisoned)?;
        Ok(partnerships.get(&Partnership::key(a, b)).cloned())
    }

    /// All partnerships involving the given tenant, any status.
    pub fn partnerships_for(&self, tenant: TenantId) -> Result<Vec<Partnership>, WeftError> {
        let partnerships = self.partnerships.read().map_err(poisoned)?;
        let mut found: Vec<Partnership> = partnerships
            .values()
            .filter(|p| p.involves(tenant))
            .cloned()
            .collect();
        found.sort_by_key(|p| Partnership::key(p.a_tenant, p.b_tenant));
        Ok(found)
    }

    /// Partner tenants the given tenant may query for a feature: the
    /// partnership is active, the partner side of it enables the feature,
    /// and both tenants' own capability flags carry the feature.
    ///
    /// Unknown tenant id is an error; a tenant with no partners (or with
    /// the feature disabled locally) yields an empty set.
    pub fn eligible_partners(
        &self,
        tenant_id: TenantId,
        feature: FederationFeature,
    ) -> Result<Vec<Tenant>, WeftError> {
        let own = self.tenant(tenant_id)?;
        if !own.features.enables(feature) {
            return Ok(Vec::new());
        }

        let partnerships = self.partnerships.read().map_err(poisoned)?;
        let tenants = self.tenants.read().map_err(poisoned)?;

        let mut partners = Vec::new();
        for partnership in partnerships.values() {
            if !partnership.is_active() {
                continue;
            }
            let partner_id = match partnership.partner_of(tenant_id) {
                Some(id) => id,
                None => continue,
            };
            let exposed = match partnership.features_exposed_by(partner_id) {
                Some(set) => set,
                None => continue,
            };
            if !exposed.enables(feature) {
                continue;
            }
            match tenants.get(&partner_id) {
                Some(partner) if partner.features.enables(feature) => {
                    partners.push(partner.clone());
                }
                _ => {}
            }
        }

        partners.sort_by_key(|t| t.id);
        Ok(partners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weft_core::FeatureSet;

    fn tenant(id: TenantId, features: FeatureSet) -> Tenant {
        Tenant {
            id,
            name: format!("Timebank {}", id),
            domain: format!("tb{}.example.org", id),
            features,
        }
    }

    fn active(a: TenantId, b: TenantId, a_features: FeatureSet, b_features: FeatureSet) -> Partnership {
        Partnership {
            a_tenant: a,
            b_tenant: b,
            status: PartnershipStatus::Active,
            since: Utc::now(),
            a_features,
            b_features,
        }
    }

    fn seeded() -> TenantPartnershipRegistry {
        let registry = TenantPartnershipRegistry::new();
        registry.register_tenant(tenant(1, FeatureSet::all())).unwrap();
        registry.register_tenant(tenant(2, FeatureSet::all())).unwrap();
        registry.register_tenant(tenant(3, FeatureSet::all())).unwrap();
        registry
    }

    #[test]
    fn unknown_tenant_is_not_found() {
        let registry = seeded();
        let err = registry
            .eligible_partners(99, FederationFeature::Members)
            .unwrap_err();
        assert!(matches!(err, WeftError::NotFound(_)));
    }

    #[test]
    fn eligible_partners_respect_partner_side_flags() {
        let registry = seeded();
        // Tenant 2 exposes only listings to tenant 1.
        registry
            .upsert_partnership(active(
                1,
                2,
                FeatureSet::all(),
                FeatureSet {
                    listings: true,
                    ..FeatureSet::none()
                },
            ))
            .unwrap();

        let for_listings = registry
            .eligible_partners(1, FederationFeature::Listings)
            .unwrap();
        assert_eq!(for_listings.len(), 1);
        assert_eq!(for_listings[0].id, 2);

        let for_members = registry
            .eligible_partners(1, FederationFeature::Members)
            .unwrap();
        assert!(for_members.is_empty());

        // The reverse direction uses tenant 1's flags, which allow everything.
        let reverse = registry
            .eligible_partners(2, FederationFeature::Members)
            .unwrap();
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse[0].id, 1);
    }

    #[test]
    fn suspended_partnerships_are_invisible() {
        let registry = seeded();
        registry
            .upsert_partnership(active(1, 2, FeatureSet::all(), FeatureSet::all()))
            .unwrap();
        registry
            .set_partnership_status(2, 1, PartnershipStatus::Suspended)
            .unwrap();

        assert!(registry
            .eligible_partners(1, FederationFeature::Members)
            .unwrap()
            .is_empty());

        registry
            .set_partnership_status(1, 2, PartnershipStatus::Active)
            .unwrap();
        assert_eq!(
            registry
                .eligible_partners(1, FederationFeature::Members)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn tenant_capability_flags_gate_eligibility() {
        let registry = TenantPartnershipRegistry::new();
        registry.register_tenant(tenant(1, FeatureSet::all())).unwrap();
        // Tenant 2 does not support events at all, whatever the partnership says.
        registry
            .register_tenant(tenant(
                2,
                FeatureSet {
                    events: false,
                    ..FeatureSet::all()
                },
            ))
            .unwrap();
        registry
            .upsert_partnership(active(1, 2, FeatureSet::all(), FeatureSet::all()))
            .unwrap();

        assert!(registry
            .eligible_partners(1, FederationFeature::Events)
            .unwrap()
            .is_empty());
        assert_eq!(
            registry
                .eligible_partners(1, FederationFeature::Groups)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn partners_are_sorted_by_id() {
        let registry = seeded();
        registry
            .upsert_partnership(active(3, 1, FeatureSet::all(), FeatureSet::all()))
            .unwrap();
        registry
            .upsert_partnership(active(1, 2, FeatureSet::all(), FeatureSet::all()))
            .unwrap();

        let partners = registry
            .eligible_partners(1, FederationFeature::Members)
            .unwrap();
        let ids: Vec<TenantId> = partners.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
