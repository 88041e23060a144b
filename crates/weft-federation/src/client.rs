// crates/weft-federation/src/client.rs
//
// TenantClient implementations: an HTTP client that speaks the partner
// JSON-RPC surface of a remote tenant, and an in-memory client serving
// canned data for tests and local embedding.
//
// Any transport or partner-side failure maps to `PartnerUnavailable` —
// the router turns that into a skipped tenant, never a failed request.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use weft_core::{
    FederatedEvent, FederatedGroup, FederatedListing, PartnerMember, RequestContext, SearchFilters,
    TenantClient, TenantId, WeftError,
};

use crate::filters;

/// Mirrors the RPC server's request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcRequest {
    method: String,
    params: serde_json::Value,
}

/// Mirrors the RPC server's response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcResponse {
    success: bool,
    result: Option<serde_json::Value>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct MembersResult {
    members: Vec<PartnerMember>,
}

#[derive(Deserialize)]
struct ListingsResult {
    listings: Vec<FederatedListing>,
}

#[derive(Deserialize)]
struct EventsResult {
    events: Vec<FederatedEvent>,
}

#[derive(Deserialize)]
struct GroupsResult {
    groups: Vec<FederatedGroup>,
}

#[derive(Deserialize)]
struct SkillsResult {
    skills: Vec<String>,
}

/// HTTP client for one partner tenant's federation endpoint.
#[derive(Debug, Clone)]
pub struct HttpTenantClient {
    tenant_id: TenantId,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTenantClient {
    /// Create a client for the partner reachable at `endpoint`. The
    /// timeout bounds every call this client makes; the router applies
    /// its own per-tenant timeout on top.
    pub fn new(tenant_id: TenantId, endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            tenant_id,
            endpoint: endpoint.into(),
            client,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, WeftError> {
        let request = JsonRpcRequest {
            method: method.to_string(),
            params,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Partner {} unreachable: {}", self.tenant_id, e);
                WeftError::PartnerUnavailable(self.tenant_id)
            })?;

        let rpc: JsonRpcResponse = resp.json().await.map_err(|e| {
            tracing::debug!("Partner {} sent an unreadable response: {}", self.tenant_id, e);
            WeftError::PartnerUnavailable(self.tenant_id)
        })?;

        if !rpc.success {
            tracing::warn!(
                "Partner {} rejected {}: {}",
                self.tenant_id,
                method,
                rpc.error.as_deref().unwrap_or("unknown error")
            );
            return Err(WeftError::PartnerUnavailable(self.tenant_id));
        }

        let result = rpc
            .result
            .ok_or(WeftError::PartnerUnavailable(self.tenant_id))?;
        serde_json::from_value(result).map_err(|e| {
            tracing::debug!("Partner {} result did not parse: {}", self.tenant_id, e);
            WeftError::PartnerUnavailable(self.tenant_id)
        })
    }

    fn query_params(filters: &SearchFilters, ctx: &RequestContext) -> serde_json::Value {
        serde_json::json!({
            "filters": filters,
            "context": ctx,
        })
    }
}

#[async_trait]
impl TenantClient for HttpTenantClient {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    async fn fetch_members(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<PartnerMember>, WeftError> {
        let result: MembersResult = self
            .call("partner/members", Self::query_params(filters, ctx))
            .await?;
        Ok(result.members)
    }

    async fn fetch_listings(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedListing>, WeftError> {
        let result: ListingsResult = self
            .call("partner/listings", Self::query_params(filters, ctx))
            .await?;
        Ok(result.listings)
    }

    async fn fetch_events(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedEvent>, WeftError> {
        let result: EventsResult = self
            .call("partner/events", Self::query_params(filters, ctx))
            .await?;
        Ok(result.events)
    }

    async fn fetch_groups(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedGroup>, WeftError> {
        let result: GroupsResult = self
            .call("partner/groups", Self::query_params(filters, ctx))
            .await?;
        Ok(result.groups)
    }

    async fn fetch_skills(
        &self,
        prefix: &str,
        ctx: &RequestContext,
    ) -> Result<Vec<String>, WeftError> {
        let params = serde_json::json!({ "q": prefix, "context": ctx });
        let result: SkillsResult = self.call("partner/skills", params).await?;
        Ok(result.skills)
    }
}

/// In-memory tenant client serving canned records.
///
/// The reference implementation of the serving side: drops owners who have
/// not opted in and pushes the shared filter predicates down onto its own
/// data, exactly as a real partner endpoint does. Can simulate a slow or
/// unreachable partner for fan-out tests.
#[derive(Debug, Default)]
pub struct StaticTenantClient {
    tenant_id: TenantId,
    members: Vec<PartnerMember>,
    listings: Vec<FederatedListing>,
    events: Vec<FederatedEvent>,
    groups: Vec<FederatedGroup>,
    delay: Option<Duration>,
    unreachable: AtomicBool,
}

impl StaticTenantClient {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            ..Self::default()
        }
    }

    pub fn with_members(mut self, members: Vec<PartnerMember>) -> Self {
        self.members = members;
        self
    }

    pub fn with_listings(mut self, listings: Vec<FederatedListing>) -> Self {
        self.listings = listings;
        self
    }

    pub fn with_events(mut self, events: Vec<FederatedEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_groups(mut self, groups: Vec<FederatedGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Delay every response, to simulate a slow partner.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every call fail with `PartnerUnavailable`, to simulate an
    /// unreachable partner.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    async fn gate(&self) -> Result<(), WeftError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(WeftError::PartnerUnavailable(self.tenant_id));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantClient for StaticTenantClient {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    async fn fetch_members(
        &self,
        filters: &SearchFilters,
        _ctx: &RequestContext,
    ) -> Result<Vec<PartnerMember>, WeftError> {
        self.gate().await?;
        Ok(self
            .members
            .iter()
            .filter(|m| m.settings.opted_in && filters::matches_member(&m.profile, filters))
            .cloned()
            .collect())
    }

    async fn fetch_listings(
        &self,
        filters: &SearchFilters,
        _ctx: &RequestContext,
    ) -> Result<Vec<FederatedListing>, WeftError> {
        self.gate().await?;
        Ok(self
            .listings
            .iter()
            .filter(|l| filters::matches_listing(l, filters))
            .cloned()
            .collect())
    }

    async fn fetch_events(
        &self,
        filters: &SearchFilters,
        _ctx: &RequestContext,
    ) -> Result<Vec<FederatedEvent>, WeftError> {
        self.gate().await?;
        Ok(self
            .events
            .iter()
            .filter(|e| filters::matches_event(e, filters))
            .cloned()
            .collect())
    }

    async fn fetch_groups(
        &self,
        filters: &SearchFilters,
        _ctx: &RequestContext,
    ) -> Result<Vec<FederatedGroup>, WeftError> {
        self.gate().await?;
        Ok(self
            .groups
            .iter()
            .filter(|g| filters::matches_group(g, filters))
            .cloned()
            .collect())
    }

    async fn fetch_skills(
        &self,
        prefix: &str,
        _ctx: &RequestContext,
    ) -> Result<Vec<String>, WeftError> {
        self.gate().await?;
        let prefix_lower = prefix.to_lowercase();
        let mut skills = BTreeSet::new();
        for member in &self.members {
            if !member.settings.opted_in || !member.settings.show_skills {
                continue;
            }
            for skill in &member.profile.skills {
                if skill.to_lowercase().starts_with(&prefix_lower) {
                    skills.insert(skill.clone());
                }
            }
        }
        Ok(skills.into_iter().collect())
    }
}
