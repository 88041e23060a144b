// crates/weft-rpc/src/server.rs
//
// RPC server setup: WeftRpcServer, RpcState, and RpcConfig.
//
// Uses a JSON-RPC-over-gRPC approach: a single tonic unary service accepts
// JSON-encoded requests with a method field and an optional caller context,
// dispatches to the appropriate handler, and returns JSON-encoded
// responses. This avoids proto codegen while still using tonic's server
// infrastructure for transport and middleware.

use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;
use uuid::Uuid;

use weft_activity::ActivityAggregator;
use weft_core::{
    RequestContext, ResourceKind, SettingsStore, Tenant, TenantClient, TenantId, UserId,
};
use weft_federation::{FederatedQueryRouter, SearchSessions, TenantPartnershipRegistry};
use weft_reputation::{ReviewSubsystem, TrustScoreEngine};

use crate::handlers;
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7410,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// Caller identity carried in the request envelope. Absent fields default
/// to the local tenant with no acting user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerContext {
    #[serde(default)]
    pub tenant_id: Option<TenantId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "search/members", "review/submit").
    pub method: String,
    /// JSON-encoded parameters for the method.
    pub params: serde_json::Value,
    /// Caller identity; explicit per request, never ambient.
    #[serde(default)]
    pub context: Option<CallerContext>,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

impl JsonRpcResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// RpcState and WeftRpcServer
// ---------------------------------------------------------------------------

/// Shared engine state the RPC handlers operate on.
pub struct RpcState {
    /// The tenant this node serves.
    pub local_tenant: Tenant,
    pub registry: Arc<TenantPartnershipRegistry>,
    pub router: Arc<FederatedQueryRouter>,
    pub sessions: Arc<SearchSessions>,
    pub aggregator: Arc<ActivityAggregator>,
    pub reviews: Arc<ReviewSubsystem>,
    pub trust: Arc<TrustScoreEngine>,
    pub settings: Arc<dyn SettingsStore>,
    /// The local directory served to partners, behind the same narrow
    /// interface the router uses to reach them.
    pub local_directory: Arc<dyn TenantClient>,
    /// Number of configured partner clients, for the health endpoint.
    pub partners_configured: usize,
    /// Daemon start time for uptime reporting.
    pub start_time: Option<Instant>,
}

/// The main RPC server for a Weft node.
#[derive(Clone)]
pub struct WeftRpcServer {
    config: RpcConfig,
    state: Arc<RpcState>,
}

impl std::fmt::Debug for WeftRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeftRpcServer")
            .field("config", &self.config)
            .field("tenant", &self.state.local_tenant.id)
            .finish()
    }
}

impl WeftRpcServer {
    pub fn new(config: RpcConfig, state: Arc<RpcState>) -> Self {
        Self { config, state }
    }

    /// Start the RPC server and listen for requests until the process is
    /// terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!(
            "Weft RPC server for tenant {} starting on {}",
            self.state.local_tenant.id,
            addr
        );

        let service = WeftServiceImpl {
            state: Arc::clone(&self.state),
            rate_limiter: Arc::new(middleware::RateLimiter::default()),
        };

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                WeftJsonRpcServer::new(service),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The internal service implementation that holds shared state and
/// dispatches JSON-RPC calls to the appropriate handler.
#[derive(Clone)]
pub(crate) struct WeftServiceImpl {
    pub(crate) state: Arc<RpcState>,
    pub(crate) rate_limiter: Arc<middleware::RateLimiter>,
}

impl WeftServiceImpl {
    /// Dispatch a JSON-RPC request on the method name.
    pub(crate) async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let ctx = request_context(&request, self.state.local_tenant.id);

        let caller_key = match ctx.caller_user_id {
            Some(user) => format!("{}/{}", ctx.caller_tenant_id, user),
            None => format!("{}/-", ctx.caller_tenant_id),
        };
        if !self.rate_limiter.check_rate_limit(&caller_key) {
            return JsonRpcResponse::failure("Rate limit exceeded".to_string());
        }

        let state = &self.state;
        let result = match request.method.as_str() {
            // Federated search
            "search/members" => {
                let router = Arc::clone(&state.router);
                let sessions = Arc::clone(&state.sessions);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::search::handle_search(
                        &router,
                        &sessions,
                        ResourceKind::Member,
                        r,
                        &ctx,
                    )
                    .await
                })
                .await
            }
            "search/listings" => {
                let router = Arc::clone(&state.router);
                let sessions = Arc::clone(&state.sessions);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::search::handle_search(
                        &router,
                        &sessions,
                        ResourceKind::Listing,
                        r,
                        &ctx,
                    )
                    .await
                })
                .await
            }
            "search/events" => {
                let router = Arc::clone(&state.router);
                let sessions = Arc::clone(&state.sessions);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::search::handle_search(
                        &router,
                        &sessions,
                        ResourceKind::Event,
                        r,
                        &ctx,
                    )
                    .await
                })
                .await
            }
            "search/groups" => {
                let router = Arc::clone(&state.router);
                let sessions = Arc::clone(&state.sessions);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::search::handle_search(
                        &router,
                        &sessions,
                        ResourceKind::Group,
                        r,
                        &ctx,
                    )
                    .await
                })
                .await
            }
            "search/skills" => {
                let router = Arc::clone(&state.router);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::search::handle_skills(&router, r, &ctx).await
                })
                .await
            }

            // Activity feed
            "activity/feed" => {
                let aggregator = Arc::clone(&state.aggregator);
                dispatch_handler(request.params, |r| async move {
                    handlers::activity::handle_feed(&aggregator, r).await
                })
                .await
            }
            "activity/mark_read" => {
                let aggregator = Arc::clone(&state.aggregator);
                dispatch_handler(request.params, |r| async move {
                    handlers::activity::handle_mark_read(&aggregator, r).await
                })
                .await
            }

            // Reviews
            "review/submit" => {
                let reviews = Arc::clone(&state.reviews);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::review::handle_submit_review(&reviews, r, &ctx).await
                })
                .await
            }
            "review/eligible" => {
                let reviews = Arc::clone(&state.reviews);
                dispatch_handler(request.params, |r| async move {
                    handlers::review::handle_eligible(&reviews, r).await
                })
                .await
            }
            "review/stats" => {
                let reviews = Arc::clone(&state.reviews);
                dispatch_handler(request.params, |r| async move {
                    handlers::review::handle_review_stats(&reviews, r).await
                })
                .await
            }
            "review/pending" => {
                let reviews = Arc::clone(&state.reviews);
                dispatch_handler(request.params, |r| async move {
                    handlers::review::handle_pending_reviews(&reviews, r).await
                })
                .await
            }

            // Trust
            "trust/score" => {
                let trust = Arc::clone(&state.trust);
                dispatch_handler(request.params, |r| async move {
                    handlers::trust::handle_trust_score(&trust, r).await
                })
                .await
            }

            // Settings
            "settings/get" => {
                let settings = Arc::clone(&state.settings);
                dispatch_handler(request.params, |r| async move {
                    handlers::settings::handle_get_settings(settings.as_ref(), r).await
                })
                .await
            }
            "settings/update" => {
                let settings = Arc::clone(&state.settings);
                dispatch_handler(request.params, |r| async move {
                    handlers::settings::handle_update_settings(settings.as_ref(), r).await
                })
                .await
            }

            // Partner-facing surface
            "partner/members" => {
                let directory = Arc::clone(&state.local_directory);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_members(directory.as_ref(), r, &ctx).await
                })
                .await
            }
            "partner/listings" => {
                let directory = Arc::clone(&state.local_directory);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_listings(directory.as_ref(), r, &ctx).await
                })
                .await
            }
            "partner/events" => {
                let directory = Arc::clone(&state.local_directory);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_events(directory.as_ref(), r, &ctx).await
                })
                .await
            }
            "partner/groups" => {
                let directory = Arc::clone(&state.local_directory);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_groups(directory.as_ref(), r, &ctx).await
                })
                .await
            }
            "partner/skills" => {
                let directory = Arc::clone(&state.local_directory);
                let ctx = ctx.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_skills(directory.as_ref(), r, &ctx).await
                })
                .await
            }
            "partner/info" => {
                let tenant = state.local_tenant.clone();
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_partner_info(&tenant, r).await
                })
                .await
            }
            "partners/list" => {
                let registry = Arc::clone(&state.registry);
                let local = state.local_tenant.id;
                dispatch_handler(request.params, |r| async move {
                    handlers::partner::handle_list_partners(&registry, local, r).await
                })
                .await
            }

            // Node
            "node/info" => {
                let tenant = state.local_tenant.clone();
                let start_time = state.start_time;
                dispatch_handler(request.params, |r| async move {
                    handlers::node::handle_node_info(&tenant, start_time, r).await
                })
                .await
            }
            "node/health" => {
                let partners = state.partners_configured;
                dispatch_handler(request.params, |r| async move {
                    handlers::node::handle_health(partners, r).await
                })
                .await
            }

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => JsonRpcResponse::failure(err),
        }
    }
}

/// Build the per-request context from the envelope.
fn request_context(request: &JsonRpcRequest, local_tenant: TenantId) -> RequestContext {
    match &request.context {
        Some(caller) => RequestContext {
            caller_tenant_id: caller.tenant_id.unwrap_or(local_tenant),
            caller_user_id: caller.user_id,
            request_id: Uuid::new_v4(),
        },
        None => RequestContext::new(local_tenant),
    }
}

/// Generic dispatch helper: deserialize params into a request type, call
/// the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single gRPC service with one logical method. Request and response are
// raw bytes (JSON-encoded JsonRpcRequest/Response), so no proto codegen.

/// The tonic service wrapper. Accepts bytes, deserializes as JSON-RPC,
/// and dispatches.
#[derive(Clone)]
pub struct WeftJsonRpcServer {
    inner: WeftServiceImpl,
}

impl std::fmt::Debug for WeftJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeftJsonRpcServer").finish()
    }
}

impl WeftJsonRpcServer {
    fn new(inner: WeftServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for WeftJsonRpcServer {
    const NAME: &'static str = "weft.rpc.WeftService";
}

impl<B> tower_service::Service<http::Request<B>> for WeftJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            // Read the full request body.
            let body = req.into_body();
            let body_bytes = match collect_body(body).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp =
                        JsonRpcResponse::failure(format!("Failed to read request body: {}", e));
                    let json = serde_json::to_vec(&resp).unwrap_or_default();
                    return Ok(build_response(json));
                }
            };

            // Deserialize the JSON-RPC request.
            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp =
                        JsonRpcResponse::failure(format!("Invalid JSON-RPC request: {}", e));
                    let json = serde_json::to_vec(&resp).unwrap_or_default();
                    return Ok(build_response(json));
                }
            };

            // Dispatch to the appropriate handler.
            let rpc_response = inner.dispatch(rpc_request).await;
            let json = serde_json::to_vec(&rpc_response).unwrap_or_default();
            Ok(build_response(json))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP response with the given JSON body.
fn build_response(json: Vec<u8>) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    http::Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use weft_core::{
        FeatureSet, FederatedMember, Partnership, PartnershipStatus, PartnerMember, PrivacyLevel,
        ServiceReach, UserFederationSettings,
    };
    use weft_federation::{RouterConfig, StaticTenantClient};
    use weft_reputation::TrustConfig;
    use weft_store::{
        MemoryActivityStore, MemoryReviewStore, MemorySettingsStore, MemoryTransactionStore,
        MemoryTrustScoreStore,
    };

    fn alice() -> PartnerMember {
        PartnerMember {
            profile: FederatedMember {
                id: 10,
                tenant_id: 2,
                name: "Alice".to_string(),
                avatar_url: None,
                bio: None,
                location: Some("Riverside".to_string()),
                skills: vec!["carpentry".to_string()],
                service_reach: Some(ServiceReach::WillTravel),
                messaging_enabled: true,
                transactions_enabled: true,
            },
            settings: UserFederationSettings {
                opted_in: true,
                privacy_level: PrivacyLevel::Economic,
                show_location: true,
                show_skills: true,
                allow_messaging: true,
                allow_transactions: true,
                ..UserFederationSettings::defaults_for(10)
            },
        }
    }

    fn service() -> WeftServiceImpl {
        let local = Tenant {
            id: 1,
            name: "Hour Exchange".to_string(),
            domain: "hours.example.org".to_string(),
            features: FeatureSet::all(),
        };
        let partner = Tenant {
            id: 2,
            name: "Harbour Timebank".to_string(),
            domain: "harbour.example.org".to_string(),
            features: FeatureSet::all(),
        };

        let registry = Arc::new(TenantPartnershipRegistry::new());
        registry.register_tenant(local.clone()).unwrap();
        registry.register_tenant(partner).unwrap();
        registry
            .upsert_partnership(Partnership {
                a_tenant: 1,
                b_tenant: 2,
                status: PartnershipStatus::Active,
                since: Utc::now(),
                a_features: FeatureSet::all(),
                b_features: FeatureSet::all(),
            })
            .unwrap();

        let partner_client: Arc<dyn TenantClient> =
            Arc::new(StaticTenantClient::new(2).with_members(vec![alice()]));
        let mut clients: HashMap<TenantId, Arc<dyn TenantClient>> = HashMap::new();
        clients.insert(2, partner_client);
        let router = Arc::new(FederatedQueryRouter::new(
            Arc::clone(&registry),
            clients,
            RouterConfig::default(),
        ));

        let reviews_store = Arc::new(MemoryReviewStore::new());
        let transactions = Arc::new(MemoryTransactionStore::new());
        let trust = Arc::new(TrustScoreEngine::new(
            reviews_store.clone(),
            transactions.clone(),
            Arc::new(MemoryTrustScoreStore::new()),
            TrustConfig::default(),
        ));

        let state = RpcState {
            local_tenant: local,
            registry,
            router,
            sessions: Arc::new(SearchSessions::new()),
            aggregator: Arc::new(ActivityAggregator::new(Arc::new(
                MemoryActivityStore::new(),
            ))),
            reviews: Arc::new(ReviewSubsystem::new(
                reviews_store,
                transactions,
                Arc::clone(&trust),
            )),
            trust,
            settings: Arc::new(MemorySettingsStore::new()),
            local_directory: Arc::new(StaticTenantClient::new(1)),
            partners_configured: 1,
            start_time: Some(Instant::now()),
        };

        WeftServiceImpl {
            state: Arc::new(state),
            rate_limiter: Arc::new(middleware::RateLimiter::default()),
        }
    }

    #[tokio::test]
    async fn search_members_dispatches_end_to_end() {
        let service = service();
        let response = service
            .dispatch(JsonRpcRequest {
                method: "search/members".to_string(),
                params: serde_json::json!({ "skills": ["carpentry", "tutoring"] }),
                context: Some(CallerContext {
                    tenant_id: Some(1),
                    user_id: Some(100),
                }),
            })
            .await;

        assert!(response.success, "error: {:?}", response.error);
        let result = response.result.unwrap();
        assert_eq!(result["tenants_consulted"], serde_json::json!([2]));
        assert_eq!(result["has_more"], serde_json::json!(false));
        assert_eq!(result["items"][0]["name"], serde_json::json!("Alice"));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let service = service();
        let response = service
            .dispatch(JsonRpcRequest {
                method: "search/everything".to_string(),
                params: serde_json::json!({}),
                context: None,
            })
            .await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("Unknown method"));
    }

    #[tokio::test]
    async fn health_reports_partner_count() {
        let service = service();
        let response = service
            .dispatch(JsonRpcRequest {
                method: "node/health".to_string(),
                params: serde_json::json!({}),
                context: None,
            })
            .await;
        assert!(response.success);
        let result = response.result.unwrap();
        assert_eq!(result["partners_configured"], serde_json::json!(1));
    }
}
