// crates/weft-rpc/src/handlers/search.rs
//
// Federated search and skills autocomplete. Each search registers with the
// caller's session, superseding any search still in flight for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weft_core::{
    FederatedRecord, ListingKind, PageCursor, RequestContext, ResourceKind, SearchFilters,
    ServiceReach, SortOrder, TenantId,
};
use weft_federation::{FederatedQueryRouter, SearchSessions};

/// Request for `search/members|listings|events|groups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    #[serde(default)]
    pub q: Option<String>,
    /// Restrict to one partner tenant.
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub category: Option<String>,
    /// Offer vs request, for listing searches.
    #[serde(default)]
    pub kind: Option<ListingKind>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub service_reach: Option<ServiceReach>,
    #[serde(default)]
    pub require_messaging: bool,
    #[serde(default)]
    pub require_transactions: bool,
    #[serde(default)]
    pub starts_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub starts_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: usize,
    /// Page size (default 20, capped at 100).
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

impl SearchRequest {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.q.clone(),
            tenant_id: self.tenant_id,
            category: self.category.clone(),
            listing_kind: self.kind,
            skills: self.skills.clone(),
            location: self.location.clone(),
            service_reach: self.service_reach,
            require_messaging: self.require_messaging,
            require_transactions: self.require_transactions,
            starts_after: self.starts_after,
            starts_before: self.starts_before,
        }
    }

    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            offset: self.offset,
            limit: self.limit.unwrap_or(PageCursor::DEFAULT_LIMIT),
        }
    }
}

/// Response for a federated search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<FederatedRecord>,
    pub has_more: bool,
    /// Tenants that actually answered; a partner missing from this list
    /// was unreachable, which the caller may surface as partial results.
    pub tenants_consulted: Vec<TenantId>,
}

/// Handle one federated search.
pub async fn handle_search(
    router: &FederatedQueryRouter,
    sessions: &SearchSessions,
    kind: ResourceKind,
    request: SearchRequest,
    ctx: &RequestContext,
) -> Result<SearchResponse, String> {
    let cancel = sessions.begin(ctx);
    let outcome = router
        .search(
            kind,
            &request.filters(),
            request.cursor(),
            request.sort.unwrap_or_default(),
            ctx,
            &cancel,
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(SearchResponse {
        items: outcome.items,
        has_more: outcome.has_more,
        tenants_consulted: outcome.tenants_consulted,
    })
}

/// Request for `search/skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsRequest {
    pub q: String,
}

/// Response for `search/skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

/// Handle a skills autocomplete request. Autocomplete calls do not
/// supersede the caller's record search.
pub async fn handle_skills(
    router: &FederatedQueryRouter,
    request: SkillsRequest,
    ctx: &RequestContext,
) -> Result<SkillsResponse, String> {
    let skills = router
        .autocomplete_skills(&request.q, ctx, &weft_federation::CancelToken::none())
        .await
        .map_err(|e| e.to_string())?;
    Ok(SkillsResponse { skills })
}
