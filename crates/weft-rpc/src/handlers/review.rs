// crates/weft-rpc/src/handlers/review.rs
//
// Review submission, eligibility, statistics, and pending-review handlers.

use serde::{Deserialize, Serialize};

use weft_core::{RequestContext, Review, Transaction, TransactionId, UserId};
use weft_reputation::ReviewSubsystem;

/// Request for `review/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub transaction_id: TransactionId,
    pub reviewer_id: UserId,
    /// Rating in [1, 5].
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response for `review/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub review: Review,
}

/// Handle a review submission.
pub async fn handle_submit_review(
    reviews: &ReviewSubsystem,
    request: SubmitReviewRequest,
    ctx: &RequestContext,
) -> Result<SubmitReviewResponse, String> {
    let review = reviews
        .submit(
            ctx,
            request.transaction_id,
            request.reviewer_id,
            request.rating,
            request.comment,
        )
        .await
        .map_err(|e| e.to_string())?;
    Ok(SubmitReviewResponse { review })
}

/// Request for `review/eligible`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleRequest {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
}

/// Response for `review/eligible`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleResponse {
    pub eligible: bool,
}

/// Handle a review eligibility check.
pub async fn handle_eligible(
    reviews: &ReviewSubsystem,
    request: EligibleRequest,
) -> Result<EligibleResponse, String> {
    let eligible = reviews
        .eligible_to_review(request.user_id, request.transaction_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(EligibleResponse { eligible })
}

/// Request for `review/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStatsRequest {
    pub member_id: UserId,
}

/// Response for `review/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStatsResponse {
    pub total: u64,
    pub average: f64,
}

/// Handle a review statistics request.
pub async fn handle_review_stats(
    reviews: &ReviewSubsystem,
    request: ReviewStatsRequest,
) -> Result<ReviewStatsResponse, String> {
    let stats = reviews
        .stats_for(request.member_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(ReviewStatsResponse {
        total: stats.total,
        average: stats.average,
    })
}

/// Request for `review/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReviewsRequest {
    pub user_id: UserId,
}

/// Response for `review/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReviewsResponse {
    /// Completed exchanges the user has not reviewed yet.
    pub transactions: Vec<Transaction>,
}

/// Handle a pending-reviews request.
pub async fn handle_pending_reviews(
    reviews: &ReviewSubsystem,
    request: PendingReviewsRequest,
) -> Result<PendingReviewsResponse, String> {
    let transactions = reviews
        .pending_for(request.user_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(PendingReviewsResponse { transactions })
}
