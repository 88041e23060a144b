// crates/weft-reputation/src/reviews.rs
//
// ReviewSubsystem: eligibility, submission, and aggregate statistics.
//
// A review requires a completed transaction, a reviewer who is one of its
// two parties, and no prior review for that (transaction, reviewer) pair.
// A successful submission triggers a fire-and-forget trust recompute for
// the reviewee — the write never waits on it.

use std::sync::Arc;

use chrono::Utc;

use weft_core::{
    RequestContext, Review, ReviewStats, ReviewStore, Transaction, TransactionId,
    TransactionStore, UserId, WeftError, MAX_REVIEW_COMMENT_CHARS,
};

use crate::trust::TrustScoreEngine;

/// The review subsystem.
pub struct ReviewSubsystem {
    reviews: Arc<dyn ReviewStore>,
    transactions: Arc<dyn TransactionStore>,
    trust: Arc<TrustScoreEngine>,
}

impl ReviewSubsystem {
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        transactions: Arc<dyn TransactionStore>,
        trust: Arc<TrustScoreEngine>,
    ) -> Self {
        Self {
            reviews,
            transactions,
            trust,
        }
    }

    /// Whether `user` may review the given transaction: it is completed,
    /// the user is one of its two parties, and no review by this user
    /// exists for it yet.
    pub async fn eligible_to_review(
        &self,
        user: UserId,
        transaction_id: TransactionId,
    ) -> Result<bool, WeftError> {
        let transaction = self
            .transactions
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| WeftError::NotFound(format!("transaction {}", transaction_id)))?;

        if !transaction.is_completed() || !transaction.is_party(user) {
            return Ok(false);
        }
        Ok(self
            .reviews
            .find_review(transaction_id, user)
            .await?
            .is_none())
    }

    /// Validate and persist a review.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        transaction_id: TransactionId,
        reviewer: UserId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review, WeftError> {
        if !(1..=5).contains(&rating) {
            return Err(WeftError::validation("rating", "must be between 1 and 5"));
        }
        if let Some(text) = &comment {
            if text.chars().count() > MAX_REVIEW_COMMENT_CHARS {
                return Err(WeftError::validation(
                    "comment",
                    format!("must be at most {} characters", MAX_REVIEW_COMMENT_CHARS),
                ));
            }
        }

        let transaction = self
            .transactions
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| WeftError::NotFound(format!("transaction {}", transaction_id)))?;

        let (reviewee, reviewee_tenant) = transaction.other_party(reviewer).ok_or_else(|| {
            WeftError::NotEligible("reviewer is not a party to this exchange".to_string())
        })?;
        if !transaction.is_completed() {
            return Err(WeftError::NotEligible(
                "only completed exchanges can be reviewed".to_string(),
            ));
        }
        if self
            .reviews
            .find_review(transaction_id, reviewer)
            .await?
            .is_some()
        {
            return Err(WeftError::DuplicateReview);
        }

        let reviewer_tenant = if transaction.sender_user_id == reviewer {
            transaction.sender_tenant_id
        } else {
            transaction.receiver_tenant_id
        };

        let mut review = Review {
            id: 0,
            transaction_id,
            reviewer_user_id: reviewer,
            reviewer_tenant_id: reviewer_tenant,
            reviewee_user_id: reviewee,
            reviewee_tenant_id: reviewee_tenant,
            rating,
            comment,
            created_at: Utc::now(),
        };
        review.id = self.reviews.save_review(&review).await?;

        tracing::info!(
            request_id = %ctx.request_id,
            "Review {} recorded: member {} rated {} by {}",
            review.id,
            reviewee,
            rating,
            reviewer
        );

        // Recompute the reviewee's trust score off the write path. The
        // submission already succeeded; a recompute failure only logs.
        let trust = Arc::clone(&self.trust);
        tokio::spawn(async move {
            if let Err(e) = trust.recompute(reviewee).await {
                tracing::warn!("Trust recompute for member {} failed: {}", reviewee, e);
            }
        });

        Ok(review)
    }

    /// Aggregate review statistics for a member.
    pub async fn stats_for(&self, member: UserId) -> Result<ReviewStats, WeftError> {
        let reviews = self.reviews.reviews_for(member).await?;
        if reviews.is_empty() {
            return Ok(ReviewStats::default());
        }
        let total = reviews.len() as u64;
        let average = reviews.iter().map(|r| r.rating as f64).sum::<f64>() / total as f64;
        Ok(ReviewStats { total, average })
    }

    /// Completed transactions the user is party to and has not reviewed.
    pub async fn pending_for(&self, user: UserId) -> Result<Vec<Transaction>, WeftError> {
        let mut pending = Vec::new();
        for transaction in self.transactions.transactions_for(user).await? {
            if !transaction.is_completed() {
                continue;
            }
            if self
                .reviews
                .find_review(transaction.id, user)
                .await?
                .is_none()
            {
                pending.push(transaction);
            }
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use weft_core::{TransactionStatus, TrustScoreStore};
    use weft_store::{MemoryReviewStore, MemoryTransactionStore, MemoryTrustScoreStore};

    use crate::trust::TrustConfig;

    struct Fixture {
        subsystem: ReviewSubsystem,
        reviews: Arc<MemoryReviewStore>,
        transactions: Arc<MemoryTransactionStore>,
        cache: Arc<MemoryTrustScoreStore>,
    }

    fn fixture() -> Fixture {
        let reviews = Arc::new(MemoryReviewStore::new());
        let transactions = Arc::new(MemoryTransactionStore::new());
        let cache = Arc::new(MemoryTrustScoreStore::new());
        let trust = Arc::new(TrustScoreEngine::new(
            reviews.clone(),
            transactions.clone(),
            cache.clone(),
            TrustConfig::default(),
        ));
        Fixture {
            subsystem: ReviewSubsystem::new(reviews.clone(), transactions.clone(), trust),
            reviews,
            transactions,
            cache,
        }
    }

    fn transaction(id: TransactionId, status: TransactionStatus) -> Transaction {
        Transaction {
            id,
            sender_user_id: 10,
            sender_tenant_id: 1,
            receiver_user_id: 20,
            receiver_tenant_id: 2,
            hours: 2.0,
            status,
            created_at: Utc::now(),
            completed_at: matches!(status, TransactionStatus::Completed).then(Utc::now),
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::for_user(1, 10)
    }

    #[tokio::test]
    async fn submit_persists_and_recomputes_trust() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Completed))
            .await
            .unwrap();

        let review = f
            .subsystem
            .submit(&ctx(), 1, 10, 5, Some("Great exchange".to_string()))
            .await
            .unwrap();
        assert_eq!(review.reviewee_user_id, 20);
        assert_eq!(review.reviewer_tenant_id, 1);
        assert_eq!(review.reviewee_tenant_id, 2);
        assert!(review.is_cross_tenant());

        // The recompute is fire-and-forget; give it a moment to land.
        let mut cached = None;
        for _ in 0..50 {
            cached = f.cache.get_score(20).await.unwrap();
            if cached.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let cached = cached.expect("trust score was not recomputed");
        assert_eq!(cached.details.review_count, 1);
    }

    #[tokio::test]
    async fn second_review_for_same_pair_is_rejected() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Completed))
            .await
            .unwrap();

        f.subsystem.submit(&ctx(), 1, 10, 4, None).await.unwrap();
        let err = f.subsystem.submit(&ctx(), 1, 10, 5, None).await.unwrap_err();
        assert!(matches!(err, WeftError::DuplicateReview));
        assert_eq!(f.reviews.reviews_for(20).await.unwrap().len(), 1);

        // The other party can still leave their own review.
        f.subsystem.submit(&ctx(), 1, 20, 5, None).await.unwrap();
    }

    #[tokio::test]
    async fn incomplete_transaction_is_not_eligible() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Pending))
            .await
            .unwrap();

        assert!(!f.subsystem.eligible_to_review(10, 1).await.unwrap());
        let err = f.subsystem.submit(&ctx(), 1, 10, 4, None).await.unwrap_err();
        assert!(matches!(err, WeftError::NotEligible(_)));
    }

    #[tokio::test]
    async fn non_party_reviewer_is_rejected() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Completed))
            .await
            .unwrap();

        let err = f.subsystem.submit(&ctx(), 1, 99, 4, None).await.unwrap_err();
        assert!(matches!(err, WeftError::NotEligible(_)));
    }

    #[tokio::test]
    async fn invalid_inputs_are_rejected_with_field_detail() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Completed))
            .await
            .unwrap();

        let err = f.subsystem.submit(&ctx(), 1, 10, 0, None).await.unwrap_err();
        assert!(matches!(err, WeftError::Validation { ref field, .. } if field == "rating"));
        let err = f.subsystem.submit(&ctx(), 1, 10, 6, None).await.unwrap_err();
        assert!(matches!(err, WeftError::Validation { ref field, .. } if field == "rating"));

        let long = "x".repeat(MAX_REVIEW_COMMENT_CHARS + 1);
        let err = f
            .subsystem
            .submit(&ctx(), 1, 10, 4, Some(long))
            .await
            .unwrap_err();
        assert!(matches!(err, WeftError::Validation { ref field, .. } if field == "comment"));

        let err = f.subsystem.submit(&ctx(), 999, 10, 4, None).await.unwrap_err();
        assert!(matches!(err, WeftError::NotFound(_)));
    }

    #[tokio::test]
    async fn stats_average_received_ratings() {
        let f = fixture();
        for (id, rating) in [(1, 5), (2, 4)] {
            f.transactions
                .save_transaction(&transaction(id, TransactionStatus::Completed))
                .await
                .unwrap();
            f.subsystem.submit(&ctx(), id, 10, rating, None).await.unwrap();
        }

        let stats = f.subsystem.stats_for(20).await.unwrap();
        assert_eq!(stats.total, 2);
        assert!((stats.average - 4.5).abs() < 1e-9);

        let none = f.subsystem.stats_for(777).await.unwrap();
        assert_eq!(none.total, 0);
        assert!((none.average - 0.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn pending_excludes_reviewed_and_incomplete() {
        let f = fixture();
        f.transactions
            .save_transaction(&transaction(1, TransactionStatus::Completed))
            .await
            .unwrap();
        f.transactions
            .save_transaction(&transaction(2, TransactionStatus::Completed))
            .await
            .unwrap();
        f.transactions
            .save_transaction(&transaction(3, TransactionStatus::Pending))
            .await
            .unwrap();
        f.subsystem.submit(&ctx(), 1, 10, 5, None).await.unwrap();

        let pending = f.subsystem.pending_for(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);
    }
}
