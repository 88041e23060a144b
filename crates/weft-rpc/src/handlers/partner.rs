// crates/weft-rpc/src/handlers/partner.rs
//
// The partner-facing surface: what another tenant's HttpTenantClient calls
// on this one. Serves the local directory through the narrow TenantClient
// interface, with the shared filter predicates pushed down onto local data.
// Opted-out owners and closed groups never leave the tenant.
//
// Also serves `partners/list` for this tenant's own UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weft_core::{
    FeatureSet, FederatedEvent, FederatedGroup, FederatedListing, PartnerMember,
    PartnershipStatus, RequestContext, SearchFilters, Tenant, TenantClient, TenantId,
};
use weft_federation::TenantPartnershipRegistry;

/// Request for the `partner/members|listings|events|groups` queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerQueryRequest {
    #[serde(default)]
    pub filters: SearchFilters,
}

/// Response for `partner/members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerMembersResponse {
    pub members: Vec<PartnerMember>,
}

pub async fn handle_partner_members(
    directory: &dyn TenantClient,
    request: PartnerQueryRequest,
    ctx: &RequestContext,
) -> Result<PartnerMembersResponse, String> {
    let members = directory
        .fetch_members(&request.filters, ctx)
        .await
        .map_err(|e| e.to_string())?;
    // The narrow interface already drops owners who have not opted in;
    // keep the guarantee even if a directory implementation forgets.
    let members = members.into_iter().filter(|m| m.settings.opted_in).collect();
    Ok(PartnerMembersResponse { members })
}

/// Response for `partner/listings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerListingsResponse {
    pub listings: Vec<FederatedListing>,
}

pub async fn handle_partner_listings(
    directory: &dyn TenantClient,
    request: PartnerQueryRequest,
    ctx: &RequestContext,
) -> Result<PartnerListingsResponse, String> {
    let listings = directory
        .fetch_listings(&request.filters, ctx)
        .await
        .map_err(|e| e.to_string())?;
    Ok(PartnerListingsResponse { listings })
}

/// Response for `partner/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerEventsResponse {
    pub events: Vec<FederatedEvent>,
}

pub async fn handle_partner_events(
    directory: &dyn TenantClient,
    request: PartnerQueryRequest,
    ctx: &RequestContext,
) -> Result<PartnerEventsResponse, String> {
    let events = directory
        .fetch_events(&request.filters, ctx)
        .await
        .map_err(|e| e.to_string())?;
    Ok(PartnerEventsResponse { events })
}

/// Response for `partner/groups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerGroupsResponse {
    pub groups: Vec<FederatedGroup>,
}

pub async fn handle_partner_groups(
    directory: &dyn TenantClient,
    request: PartnerQueryRequest,
    ctx: &RequestContext,
) -> Result<PartnerGroupsResponse, String> {
    let groups = directory
        .fetch_groups(&request.filters, ctx)
        .await
        .map_err(|e| e.to_string())?;
    // Groups closed to federated membership stay inside the tenant.
    let groups = groups.into_iter().filter(|g| g.open_to_partners).collect();
    Ok(PartnerGroupsResponse { groups })
}

/// Request for `partner/skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSkillsRequest {
    pub q: String,
}

/// Response for `partner/skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSkillsResponse {
    pub skills: Vec<String>,
}

pub async fn handle_partner_skills(
    directory: &dyn TenantClient,
    request: PartnerSkillsRequest,
    ctx: &RequestContext,
) -> Result<PartnerSkillsResponse, String> {
    let skills = directory
        .fetch_skills(&request.q, ctx)
        .await
        .map_err(|e| e.to_string())?;
    Ok(PartnerSkillsResponse { skills })
}

/// Request for `partner/info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerInfoRequest {}

/// Response for `partner/info`: this tenant's identity and capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerInfoResponse {
    pub tenant: Tenant,
}

pub async fn handle_partner_info(
    local_tenant: &Tenant,
    _request: PartnerInfoRequest,
) -> Result<PartnerInfoResponse, String> {
    Ok(PartnerInfoResponse {
        tenant: local_tenant.clone(),
    })
}

/// Request for `partners/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPartnersRequest {
    /// Include non-active partnerships too.
    #[serde(default)]
    pub all_statuses: bool,
}

/// One partnership as seen from the local tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerView {
    pub tenant_id: TenantId,
    pub name: String,
    pub domain: String,
    pub status: PartnershipStatus,
    pub since: DateTime<Utc>,
    /// What the partner exposes to us.
    pub offers: FeatureSet,
    /// What we expose to the partner.
    pub accepts: FeatureSet,
}

/// Response for `partners/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPartnersResponse {
    pub partners: Vec<PartnerView>,
}

pub async fn handle_list_partners(
    registry: &TenantPartnershipRegistry,
    local_tenant_id: TenantId,
    request: ListPartnersRequest,
) -> Result<ListPartnersResponse, String> {
    let partnerships = registry
        .partnerships_for(local_tenant_id)
        .map_err(|e| e.to_string())?;

    let mut partners = Vec::new();
    for partnership in partnerships {
        if !request.all_statuses && !partnership.is_active() {
            continue;
        }
        let Some(partner_id) = partnership.partner_of(local_tenant_id) else {
            continue;
        };
        let partner = registry.tenant(partner_id).map_err(|e| e.to_string())?;
        let offers = partnership
            .features_exposed_by(partner_id)
            .copied()
            .unwrap_or_default();
        let accepts = partnership
            .features_exposed_by(local_tenant_id)
            .copied()
            .unwrap_or_default();
        partners.push(PartnerView {
            tenant_id: partner_id,
            name: partner.name,
            domain: partner.domain,
            status: partnership.status,
            since: partnership.since,
            offers,
            accepts,
        });
    }

    Ok(ListPartnersResponse { partners })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{
        FederatedMember, PrivacyLevel, ServiceReach, UserFederationSettings, UserId,
    };
    use weft_federation::StaticTenantClient;

    fn member(id: UserId, opted_in: bool) -> PartnerMember {
        PartnerMember {
            profile: FederatedMember {
                id,
                tenant_id: 1,
                name: format!("Member {}", id),
                avatar_url: None,
                bio: None,
                location: None,
                skills: vec!["gardening".to_string()],
                service_reach: Some(ServiceReach::LocalOnly),
                messaging_enabled: false,
                transactions_enabled: false,
            },
            settings: UserFederationSettings {
                opted_in,
                privacy_level: PrivacyLevel::Social,
                show_skills: true,
                ..UserFederationSettings::defaults_for(id)
            },
        }
    }

    #[tokio::test]
    async fn opted_out_members_never_leave_the_tenant() {
        let directory = StaticTenantClient::new(1)
            .with_members(vec![member(1, true), member(2, false)]);
        let resp = handle_partner_members(
            &directory,
            PartnerQueryRequest::default(),
            &RequestContext::new(2),
        )
        .await
        .unwrap();
        assert_eq!(resp.members.len(), 1);
        assert_eq!(resp.members[0].profile.id, 1);
    }

    #[tokio::test]
    async fn closed_groups_never_leave_the_tenant() {
        let now = Utc::now();
        let directory = StaticTenantClient::new(1).with_groups(vec![
            FederatedGroup {
                id: 1,
                tenant_id: 1,
                name: "Open".to_string(),
                description: String::new(),
                member_count: 3,
                open_to_partners: true,
                last_active_at: now,
            },
            FederatedGroup {
                id: 2,
                tenant_id: 1,
                name: "Closed".to_string(),
                description: String::new(),
                member_count: 5,
                open_to_partners: false,
                last_active_at: now,
            },
        ]);
        let resp = handle_partner_groups(
            &directory,
            PartnerQueryRequest::default(),
            &RequestContext::new(2),
        )
        .await
        .unwrap();
        assert_eq!(resp.groups.len(), 1);
        assert_eq!(resp.groups[0].name, "Open");
    }
}
