// crates/weft-rpc/src/handlers/trust.rs

use serde::{Deserialize, Serialize};

use weft_core::{TrustScore, UserId};
use weft_reputation::TrustScoreEngine;

/// Request for `trust/score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScoreRequest {
    pub member_id: UserId,
}

/// Response for `trust/score`: the full score row, including the component
/// breakdown and the inputs it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScoreResponse {
    #[serde(flatten)]
    pub score: TrustScore,
}

/// Handle a trust score request. Serves the cached score when fresh,
/// recomputing synchronously otherwise.
pub async fn handle_trust_score(
    trust: &TrustScoreEngine,
    request: TrustScoreRequest,
) -> Result<TrustScoreResponse, String> {
    let score = trust
        .score(request.member_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(TrustScoreResponse { score })
}
