// crates/weft-reputation/src/trust.rs
//
// TrustScoreEngine: derives a member's 0-100 reputation from reviews,
// completed transactions, and cross-tenant activity.
//
// The read path serves the cached score unless it is older than the
// configured staleness bound, in which case it recomputes synchronously.
// Recomputation runs under a per-member lock so concurrent triggers (a
// review and a completing transaction at once) do not duplicate work.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use weft_core::{
    ReviewStore, TransactionStore, TrustComponents, TrustDetails, TrustLevel, TrustScore,
    TrustScoreStore, UserId, WeftError,
};

/// Scoring weights. Configuration constants, not business law: any
/// non-negative values keep the score within [0, 100] after clamping and
/// keep it monotonic in review and transaction counts.
#[derive(Debug, Clone)]
pub struct TrustWeights {
    /// Points awarded for a perfect 5.0 review average.
    pub rating_weight: f64,
    /// Points per received review, up to the volume cap.
    pub review_volume_weight: f64,
    pub review_volume_cap: u64,
    /// Points per completed transaction, up to the cap.
    pub transaction_weight: f64,
    pub transaction_cap: u64,
    /// Flat bonus for any cross-tenant review or completed transaction.
    pub cross_tenant_bonus: f64,
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            rating_weight: 40.0,
            review_volume_weight: 0.4,
            review_volume_cap: 25,
            transaction_weight: 0.3,
            transaction_cap: 50,
            cross_tenant_bonus: 10.0,
        }
    }
}

/// Engine configuration: weights plus the cache staleness bound.
#[derive(Debug, Clone)]
pub struct TrustConfig {
    pub weights: TrustWeights,
    /// Maximum age a cached score may be served at.
    pub staleness: Duration,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            weights: TrustWeights::default(),
            staleness: Duration::from_secs(300),
        }
    }
}

/// Compute the score and its component breakdown from raw inputs.
pub fn compute_score(details: &TrustDetails, weights: &TrustWeights) -> (u8, TrustComponents) {
    let rating_points = weights.rating_weight * (details.average_rating / 5.0);
    let volume_points =
        weights.review_volume_weight * details.review_count.min(weights.review_volume_cap) as f64;
    let transaction_points = weights.transaction_weight
        * details
            .completed_transactions
            .min(weights.transaction_cap) as f64;
    let cross_tenant_points = if details.cross_tenant_activity {
        weights.cross_tenant_bonus
    } else {
        0.0
    };

    let total =
        (rating_points + volume_points + transaction_points + cross_tenant_points).clamp(0.0, 100.0);
    let components = TrustComponents {
        rating_points,
        volume_points,
        transaction_points,
        cross_tenant_points,
    };
    (total.round() as u8, components)
}

/// The trust score engine.
pub struct TrustScoreEngine {
    reviews: Arc<dyn ReviewStore>,
    transactions: Arc<dyn TransactionStore>,
    cache: Arc<dyn TrustScoreStore>,
    config: TrustConfig,
    /// Per-member recompute locks, created lazily.
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl TrustScoreEngine {
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        transactions: Arc<dyn TransactionStore>,
        cache: Arc<dyn TrustScoreStore>,
        config: TrustConfig,
    ) -> Self {
        Self {
            reviews,
            transactions,
            cache,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The member's score, served from cache when fresh enough.
    pub async fn score(&self, member: UserId) -> Result<TrustScore, WeftError> {
        if let Some(cached) = self.cache.get_score(member).await? {
            let age = Utc::now().signed_duration_since(cached.cached_at);
            let bound = chrono::Duration::from_std(self.config.staleness)
                .unwrap_or_else(|_| chrono::Duration::seconds(300));
            if age <= bound {
                return Ok(cached);
            }
            tracing::debug!("Trust score for member {} is stale; recomputing", member);
        }
        self.recompute(member).await
    }

    /// Recompute and cache the member's score. Called on review ingestion
    /// and on transactions completing; safe to call concurrently.
    pub async fn recompute(&self, member: UserId) -> Result<TrustScore, WeftError> {
        let lock = self.member_lock(member).await;
        let _guard = lock.lock().await;

        let reviews = self.reviews.reviews_for(member).await?;
        let transactions = self.transactions.transactions_for(member).await?;

        let review_count = reviews.len() as u64;
        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(|r| r.rating as f64).sum::<f64>() / reviews.len() as f64
        };
        let completed_transactions =
            transactions.iter().filter(|t| t.is_completed()).count() as u64;
        let cross_tenant_activity = reviews.iter().any(|r| r.is_cross_tenant())
            || transactions
                .iter()
                .any(|t| t.is_completed() && t.is_cross_tenant());

        let details = TrustDetails {
            review_count,
            average_rating,
            completed_transactions,
            cross_tenant_activity,
        };
        let (score, components) = compute_score(&details, &self.config.weights);

        let row = TrustScore {
            member_id: member,
            score,
            level: TrustLevel::from_score(score),
            components,
            details,
            cached_at: Utc::now(),
        };
        self.cache.save_score(&row).await?;
        Ok(row)
    }

    async fn member_lock(&self, member: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(member)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use weft_core::{Review, Transaction, TransactionStatus};
    use weft_store::{MemoryReviewStore, MemoryTransactionStore, MemoryTrustScoreStore};

    fn details(
        review_count: u64,
        average_rating: f64,
        completed_transactions: u64,
        cross_tenant_activity: bool,
    ) -> TrustDetails {
        TrustDetails {
            review_count,
            average_rating,
            completed_transactions,
            cross_tenant_activity,
        }
    }

    #[test]
    fn score_is_always_within_bounds() {
        let weights = TrustWeights::default();
        let (zero, _) = compute_score(&details(0, 0.0, 0, false), &weights);
        assert_eq!(zero, 0);

        let (max, _) = compute_score(&details(1000, 5.0, 1000, true), &weights);
        assert!(max <= 100);
        // 40 + 10 + 15 + 10 = 75 under the default weights.
        assert_eq!(max, 75);
    }

    #[test]
    fn score_is_monotonic_in_counts() {
        let weights = TrustWeights::default();
        let mut previous = 0;
        for count in 0..60 {
            let (score, _) = compute_score(&details(count, 4.0, 0, false), &weights);
            assert!(score >= previous, "score dropped at review count {}", count);
            previous = score;
        }

        let mut previous = 0;
        for count in 0..120 {
            let (score, _) = compute_score(&details(5, 4.0, count, false), &weights);
            assert!(
                score >= previous,
                "score dropped at transaction count {}",
                count
            );
            previous = score;
        }
    }

    #[test]
    fn cross_tenant_bonus_is_flat() {
        let weights = TrustWeights::default();
        let (without, _) = compute_score(&details(10, 4.5, 10, false), &weights);
        let (with, components) = compute_score(&details(10, 4.5, 10, true), &weights);
        assert_eq!(with, without + 10);
        assert!((components.cross_tenant_points - 10.0).abs() < 1e-9);
    }

    fn review(reviewee: UserId, rating: u8, cross_tenant: bool) -> Review {
        Review {
            id: 0,
            transaction_id: 1,
            reviewer_user_id: 99,
            reviewer_tenant_id: if cross_tenant { 2 } else { 1 },
            reviewee_user_id: reviewee,
            reviewee_tenant_id: 1,
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }

    fn completed_transaction(id: u64, user: UserId) -> Transaction {
        Transaction {
            id,
            sender_user_id: user,
            sender_tenant_id: 1,
            receiver_user_id: 99,
            receiver_tenant_id: 1,
            hours: 1.0,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    fn engine() -> (
        TrustScoreEngine,
        Arc<MemoryReviewStore>,
        Arc<MemoryTransactionStore>,
        Arc<MemoryTrustScoreStore>,
    ) {
        let reviews = Arc::new(MemoryReviewStore::new());
        let transactions = Arc::new(MemoryTransactionStore::new());
        let cache = Arc::new(MemoryTrustScoreStore::new());
        let engine = TrustScoreEngine::new(
            reviews.clone(),
            transactions.clone(),
            cache.clone(),
            TrustConfig::default(),
        );
        (engine, reviews, transactions, cache)
    }

    #[tokio::test]
    async fn recompute_reads_stores_and_caches() {
        let (engine, reviews, transactions, cache) = engine();
        reviews.save_review(&review(7, 5, true)).await.unwrap();
        reviews.save_review(&review(7, 4, false)).await.unwrap();
        transactions
            .save_transaction(&completed_transaction(1, 7))
            .await
            .unwrap();

        let score = engine.recompute(7).await.unwrap();
        assert_eq!(score.details.review_count, 2);
        assert!((score.details.average_rating - 4.5).abs() < 1e-9);
        assert_eq!(score.details.completed_transactions, 1);
        assert!(score.details.cross_tenant_activity);
        // 40*(4.5/5) + 0.4*2 + 0.3*1 + 10 = 47.1 -> 47.
        assert_eq!(score.score, 47);
        assert_eq!(score.level, TrustLevel::Established);

        assert!(cache.get_score(7).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn fresh_cache_is_served_verbatim() {
        let (engine, _, _, cache) = engine();
        let sentinel = TrustScore {
            member_id: 7,
            score: 77,
            level: TrustLevel::Trusted,
            components: TrustComponents::default(),
            details: TrustDetails::default(),
            cached_at: Utc::now(),
        };
        cache.save_score(&sentinel).await.unwrap();

        let served = engine.score(7).await.unwrap();
        assert_eq!(served.score, 77);
    }

    #[tokio::test]
    async fn stale_cache_triggers_synchronous_recompute() {
        let (engine, _, _, cache) = engine();
        let stale = TrustScore {
            member_id: 7,
            score: 77,
            level: TrustLevel::Trusted,
            components: TrustComponents::default(),
            details: TrustDetails::default(),
            cached_at: Utc::now() - ChronoDuration::seconds(600),
        };
        cache.save_score(&stale).await.unwrap();

        // No reviews or transactions exist, so the recompute lands on zero.
        let served = engine.score(7).await.unwrap();
        assert_eq!(served.score, 0);
        assert_eq!(served.level, TrustLevel::New);
    }
}
