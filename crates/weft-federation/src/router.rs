// crates/weft-federation/src/router.rs
//
// FederatedQueryRouter: fans a single logical search out across all
// eligible partner tenants concurrently, applies privacy gating to every
// returned record, merges under a stable composite sort key, and paginates.
//
// Degradation rules: a partner that times out or errors is skipped and
// excluded from `tenants_consulted`; a registry failure is fatal. A newer
// search from the same caller session supersedes an in-flight one — the
// fan-out aborts and returns `Cancelled`.
//
// No server-held pagination state exists. Each paginated call re-queries
// all tenants independently; if underlying data changes between pages, a
// record may appear twice or be skipped once. That is an accepted property
// of offset pagination over live partners, not a defect.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;

use weft_core::{
    FeatureSet, FederatedRecord, FederationFeature, PageCursor, RequestContext, ResourceKind,
    SearchFilters, SortOrder, TenantClient, TenantId, UserId, WeftError,
};

use crate::filters;
use crate::privacy;
use crate::registry::TenantPartnershipRegistry;

/// Tuning knobs for the fan-out.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Independent timeout for each partner call.
    pub per_tenant_timeout: Duration,
    /// Global deadline for one search, regardless of per-tenant timeouts.
    pub request_deadline: Duration,
    /// Cap on merged skill-autocomplete suggestions.
    pub max_skill_suggestions: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            per_tenant_timeout: Duration::from_secs(5),
            request_deadline: Duration::from_secs(15),
            max_skill_suggestions: 20,
        }
    }
}

/// Result of one federated search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The requested page of the merged result set.
    pub items: Vec<FederatedRecord>,
    /// Whether records exist past this page.
    pub has_more: bool,
    /// Tenants that actually answered. A caller can distinguish "no
    /// partners" from "partner unreachable" by comparing this against its
    /// expectations.
    pub tenants_consulted: Vec<TenantId>,
}

/// Cancellation handle for one search. Obtained from `SearchSessions`;
/// a token that was never attached to a session never fires.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that can never be cancelled.
    pub fn none() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow(),
            None => false,
        }
    }

    /// Resolves when the token is cancelled; pends forever otherwise.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Session dropped without cancelling; never fire.
                return std::future::pending().await;
            }
        }
    }
}

/// Tracks the in-flight search per caller session. Beginning a new search
/// cancels the caller's previous one (a user typing in a search box issues
/// a stream of superseding queries).
#[derive(Debug, Default)]
pub struct SearchSessions {
    inner: Mutex<HashMap<(TenantId, Option<UserId>), watch::Sender<bool>>>,
}

impl SearchSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new search for the caller, cancelling any previous one.
    pub fn begin(&self, ctx: &RequestContext) -> CancelToken {
        let key = (ctx.caller_tenant_id, ctx.caller_user_id);
        let (tx, rx) = watch::channel(false);
        let mut sessions = self.inner.lock().expect("sessions lock poisoned");
        if let Some(previous) = sessions.insert(key, tx) {
            let _ = previous.send(true);
        }
        CancelToken { rx: Some(rx) }
    }
}

/// One tenant's raw answer to a fan-out call, before gating.
enum TenantBatch {
    Members(Vec<weft_core::PartnerMember>),
    Listings(Vec<weft_core::FederatedListing>),
    Events(Vec<weft_core::FederatedEvent>),
    Groups(Vec<weft_core::FederatedGroup>),
}

/// The federated query router.
pub struct FederatedQueryRouter {
    registry: Arc<TenantPartnershipRegistry>,
    clients: HashMap<TenantId, Arc<dyn TenantClient>>,
    config: RouterConfig,
}

impl FederatedQueryRouter {
    pub fn new(
        registry: Arc<TenantPartnershipRegistry>,
        clients: HashMap<TenantId, Arc<dyn TenantClient>>,
        config: RouterConfig,
    ) -> Self {
        Self {
            registry,
            clients,
            config,
        }
    }

    /// Run a federated search for one resource kind.
    pub async fn search(
        &self,
        kind: ResourceKind,
        search_filters: &SearchFilters,
        cursor: PageCursor,
        sort: SortOrder,
        ctx: &RequestContext,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, WeftError> {
        let cursor = cursor.clamped();

        // Step 1: eligible tenant set. Registry failure is fatal.
        let mut partners = self
            .registry
            .eligible_partners(ctx.caller_tenant_id, kind.required_feature())?;
        if let Some(only) = search_filters.tenant_id {
            partners.retain(|t| t.id == only);
        }

        // What each partner's side of its partnership exposes to us; the
        // privacy gate needs it per returned record.
        let mut exposures: HashMap<TenantId, FeatureSet> = HashMap::new();
        for partner in &partners {
            if let Some(p) = self
                .registry
                .partnership_between(ctx.caller_tenant_id, partner.id)?
            {
                if let Some(f) = p.features_exposed_by(partner.id) {
                    exposures.insert(partner.id, *f);
                }
            }
        }

        // Step 2: fan out, one bounded call per partner.
        let mut tasks: JoinSet<(TenantId, Result<TenantBatch, WeftError>)> = JoinSet::new();
        for partner in &partners {
            let client = match self.clients.get(&partner.id) {
                Some(c) => Arc::clone(c),
                None => {
                    tracing::warn!("No client configured for partner tenant {}", partner.id);
                    continue;
                }
            };
            let tenant_id = partner.id;
            let call_filters = search_filters.clone();
            let call_ctx = ctx.clone();
            let per_tenant = self.config.per_tenant_timeout;

            tasks.spawn(async move {
                let fetched = tokio::time::timeout(per_tenant, async {
                    match kind {
                        ResourceKind::Member => client
                            .fetch_members(&call_filters, &call_ctx)
                            .await
                            .map(TenantBatch::Members),
                        ResourceKind::Listing => client
                            .fetch_listings(&call_filters, &call_ctx)
                            .await
                            .map(TenantBatch::Listings),
                        ResourceKind::Event => client
                            .fetch_events(&call_filters, &call_ctx)
                            .await
                            .map(TenantBatch::Events),
                        ResourceKind::Group => client
                            .fetch_groups(&call_filters, &call_ctx)
                            .await
                            .map(TenantBatch::Groups),
                    }
                })
                .await;

                let result = match fetched {
                    Ok(r) => r,
                    Err(_) => Err(WeftError::PartnerUnavailable(tenant_id)),
                };
                (tenant_id, result)
            });
        }

        // Steps 3-4: drain answers under the global deadline, gating and
        // merging as they arrive.
        let mut consulted: Vec<TenantId> = Vec::new();
        let mut merged: Vec<FederatedRecord> = Vec::new();
        let deadline = tokio::time::sleep(self.config.request_deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(WeftError::Cancelled);
                }
                _ = &mut deadline => {
                    tracing::warn!(
                        "Search deadline reached with {} partner calls outstanding",
                        tasks.len()
                    );
                    tasks.abort_all();
                    break;
                }
                next = tasks.join_next() => {
                    match next {
                        None => break,
                        Some(Err(e)) => {
                            tracing::warn!("Fan-out task failed: {}", e);
                        }
                        Some(Ok((tenant_id, Err(e)))) => {
                            tracing::warn!("Partner tenant {} skipped: {}", tenant_id, e);
                        }
                        Some(Ok((tenant_id, Ok(batch)))) => {
                            consulted.push(tenant_id);
                            let exposure =
                                exposures.get(&tenant_id).copied().unwrap_or_default();
                            collect_batch(batch, &exposure, search_filters, &mut merged);
                        }
                    }
                }
            }
        }

        // Step 5: merge order and page slice.
        consulted.sort_unstable();
        merged.sort_by(|a, b| compare_records(a, b, sort));
        let has_more = merged.len() > cursor.offset + cursor.limit;
        let items = merged
            .into_iter()
            .skip(cursor.offset)
            .take(cursor.limit)
            .collect();

        Ok(SearchOutcome {
            items,
            has_more,
            tenants_consulted: consulted,
        })
    }

    /// The narrower variant of the same fan-out: distinct skill tokens
    /// matching a prefix, merged across all member-eligible partners.
    pub async fn autocomplete_skills(
        &self,
        prefix: &str,
        ctx: &RequestContext,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, WeftError> {
        let partners = self
            .registry
            .eligible_partners(ctx.caller_tenant_id, FederationFeature::Members)?;

        let mut tasks: JoinSet<(TenantId, Result<Vec<String>, WeftError>)> = JoinSet::new();
        for partner in &partners {
            let client = match self.clients.get(&partner.id) {
                Some(c) => Arc::clone(c),
                None => continue,
            };
            let tenant_id = partner.id;
            let call_ctx = ctx.clone();
            let call_prefix = prefix.to_string();
            let per_tenant = self.config.per_tenant_timeout;

            tasks.spawn(async move {
                let fetched =
                    tokio::time::timeout(per_tenant, client.fetch_skills(&call_prefix, &call_ctx))
                        .await;
                let result = match fetched {
                    Ok(r) => r,
                    Err(_) => Err(WeftError::PartnerUnavailable(tenant_id)),
                };
                (tenant_id, result)
            });
        }

        // Dedup case-insensitively, first spelling wins, ordered by key.
        let mut dedup: BTreeMap<String, String> = BTreeMap::new();
        let deadline = tokio::time::sleep(self.config.request_deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(WeftError::Cancelled);
                }
                _ = &mut deadline => {
                    tasks.abort_all();
                    break;
                }
                next = tasks.join_next() => {
                    match next {
                        None => break,
                        Some(Err(e)) => {
                            tracing::warn!("Skill fan-out task failed: {}", e);
                        }
                        Some(Ok((tenant_id, Err(e)))) => {
                            tracing::debug!("Partner tenant {} skipped for skills: {}", tenant_id, e);
                        }
                        Some(Ok((_, Ok(skills)))) => {
                            for skill in skills {
                                dedup.entry(skill.to_lowercase()).or_insert(skill);
                            }
                        }
                    }
                }
            }
        }

        let mut suggestions: Vec<String> = dedup.into_values().collect();
        suggestions.truncate(self.config.max_skill_suggestions);
        Ok(suggestions)
    }
}

/// Gate and filter one tenant's batch into the merged set.
fn collect_batch(
    batch: TenantBatch,
    exposure: &FeatureSet,
    search_filters: &SearchFilters,
    merged: &mut Vec<FederatedRecord>,
) {
    match batch {
        TenantBatch::Members(members) => {
            for member in members {
                let Some(redacted) =
                    privacy::redact_member(member.profile, &member.settings, exposure)
                else {
                    continue;
                };
                // Re-check after redaction: a filter must not match on a
                // field the viewer cannot see.
                if filters::matches_member(&redacted, search_filters) {
                    merged.push(FederatedRecord::Member(redacted));
                }
            }
        }
        TenantBatch::Listings(listings) => {
            for listing in listings {
                if filters::matches_listing(&listing, search_filters) {
                    merged.push(FederatedRecord::Listing(listing));
                }
            }
        }
        TenantBatch::Events(events) => {
            for event in events {
                if filters::matches_event(&event, search_filters) {
                    merged.push(FederatedRecord::Event(event));
                }
            }
        }
        TenantBatch::Groups(groups) => {
            for group in groups {
                if group.open_to_partners && filters::matches_group(&group, search_filters) {
                    merged.push(FederatedRecord::Group(group));
                }
            }
        }
    }
}

fn name_key(record: &FederatedRecord) -> String {
    record.display_name().to_lowercase()
}

/// Stable composite ordering: the primary sort field, then
/// `(tenant_id, record_id)` as tiebreaker. The tiebreaker guarantees a
/// total, deterministic order, which keeps successive paginated calls
/// from duplicating or dropping rows over a static data set.
fn compare_records(a: &FederatedRecord, b: &FederatedRecord, sort: SortOrder) -> CmpOrdering {
    let primary = match sort {
        SortOrder::Name => name_key(a).cmp(&name_key(b)),
        SortOrder::Recent => match (a.recency(), b.recency()) {
            (Some(x), Some(y)) => y.cmp(&x),
            _ => name_key(a).cmp(&name_key(b)),
        },
        SortOrder::Active => match (a.activity(), b.activity()) {
            (Some(x), Some(y)) => y.cmp(&x),
            _ => name_key(a).cmp(&name_key(b)),
        },
    };
    primary.then_with(|| (a.tenant_id(), a.record_id()).cmp(&(b.tenant_id(), b.record_id())))
}
