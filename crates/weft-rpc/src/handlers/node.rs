// crates/weft-rpc/src/handlers/node.rs
//
// Node identity and health handlers.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use weft_core::{Tenant, TenantId};

/// Request for `node/info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInfoRequest {}

/// Response for `node/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoResponse {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub domain: String,
    pub version: String,
    pub uptime_seconds: Option<u64>,
}

/// Handle a node info request.
pub async fn handle_node_info(
    local_tenant: &Tenant,
    start_time: Option<Instant>,
    _request: NodeInfoRequest,
) -> Result<NodeInfoResponse, String> {
    Ok(NodeInfoResponse {
        tenant_id: local_tenant.id,
        tenant_name: local_tenant.name.clone(),
        domain: local_tenant.domain.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.map(|t| t.elapsed().as_secs()),
    })
}

/// Request for `node/health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthRequest {}

/// Response for `node/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub partners_configured: usize,
}

/// Handle a health check.
pub async fn handle_health(
    partners_configured: usize,
    _request: HealthRequest,
) -> Result<HealthResponse, String> {
    Ok(HealthResponse {
        status: "ok".to_string(),
        partners_configured,
    })
}
