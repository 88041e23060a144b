// crates/weft-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the weft-daemon HTTP endpoint.

use serde::{Deserialize, Serialize};

/// Mirrors the server's caller context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerContext {
    pub tenant_id: Option<u64>,
    pub user_id: Option<u64>,
}

/// Mirrors the server's JsonRpcRequest envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    pub params: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<CallerContext>,
}

/// Mirrors the server's JsonRpcResponse envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Send a JSON-RPC call to the daemon and return the unwrapped result.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
    context: Option<CallerContext>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
        context,
    };

    let client = reqwest::Client::new();
    let resp = client.post(endpoint).json(&request).send().await?;
    let rpc_response: JsonRpcResponse = resp.json().await?;

    if !rpc_response.success {
        return Err(rpc_response
            .error
            .unwrap_or_else(|| "Unknown error".to_string())
            .into());
    }
    Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
}
