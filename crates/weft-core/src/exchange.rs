// crates/weft-core/src/exchange.rs
//
// Time-credit transactions, reviews, and the trust score derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ReviewId, TenantId, TransactionId, UserId};

/// Maximum length of a review comment, in characters.
pub const MAX_REVIEW_COMMENT_CHARS: usize = 2000;

/// Lifecycle of a time-credit transaction. Reviews are only possible once
/// a transaction reaches `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

/// A time-credit transfer between two members, possibly across tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub sender_user_id: UserId,
    pub sender_tenant_id: TenantId,
    pub receiver_user_id: UserId,
    pub receiver_tenant_id: TenantId,
    pub hours: f64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether the given user is the sender or receiver.
    pub fn is_party(&self, user: UserId) -> bool {
        self.sender_user_id == user || self.receiver_user_id == user
    }

    /// The other party of the transaction, as (user, tenant).
    pub fn other_party(&self, user: UserId) -> Option<(UserId, TenantId)> {
        if self.sender_user_id == user {
            Some((self.receiver_user_id, self.receiver_tenant_id))
        } else if self.receiver_user_id == user {
            Some((self.sender_user_id, self.sender_tenant_id))
        } else {
            None
        }
    }

    pub fn is_cross_tenant(&self) -> bool {
        self.sender_tenant_id != self.receiver_tenant_id
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// A rating left by one party of a completed transaction for the other.
///
/// At most one review exists per (transaction, reviewer) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub transaction_id: TransactionId,
    pub reviewer_user_id: UserId,
    pub reviewer_tenant_id: TenantId,
    pub reviewee_user_id: UserId,
    pub reviewee_tenant_id: TenantId,
    /// Rating in [1, 5].
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn is_cross_tenant(&self) -> bool {
        self.reviewer_tenant_id != self.reviewee_tenant_id
    }
}

/// Aggregate review statistics for one member.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: u64,
    /// Mean rating over received reviews; 0.0 when there are none.
    pub average: f64,
}

/// Qualitative trust level, derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    New,
    Growing,
    Established,
    Trusted,
    Excellent,
}

impl TrustLevel {
    /// Map a score in [0, 100] to its level:
    /// 0 → New, 1–29 → Growing, 30–59 → Established,
    /// 60–84 → Trusted, 85–100 → Excellent.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => TrustLevel::New,
            1..=29 => TrustLevel::Growing,
            30..=59 => TrustLevel::Established,
            60..=84 => TrustLevel::Trusted,
            _ => TrustLevel::Excellent,
        }
    }
}

/// Point contributions of each weak signal to a trust score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrustComponents {
    pub rating_points: f64,
    pub volume_points: f64,
    pub transaction_points: f64,
    pub cross_tenant_points: f64,
}

/// The raw inputs a trust score was computed from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrustDetails {
    pub review_count: u64,
    pub average_rating: f64,
    pub completed_transactions: u64,
    pub cross_tenant_activity: bool,
}

/// A member's cached reputation score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    pub member_id: UserId,
    /// Score in [0, 100].
    pub score: u8,
    pub level: TrustLevel,
    pub components: TrustComponents,
    pub details: TrustDetails,
    pub cached_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_party_resolves_both_directions() {
        let t = Transaction {
            id: 1,
            sender_user_id: 10,
            sender_tenant_id: 1,
            receiver_user_id: 20,
            receiver_tenant_id: 2,
            hours: 2.5,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        };
        assert_eq!(t.other_party(10), Some((20, 2)));
        assert_eq!(t.other_party(20), Some((10, 1)));
        assert_eq!(t.other_party(99), None);
        assert!(t.is_cross_tenant());
    }

    #[test]
    fn trust_level_thresholds() {
        assert_eq!(TrustLevel::from_score(0), TrustLevel::New);
        assert_eq!(TrustLevel::from_score(1), TrustLevel::Growing);
        assert_eq!(TrustLevel::from_score(29), TrustLevel::Growing);
        assert_eq!(TrustLevel::from_score(30), TrustLevel::Established);
        assert_eq!(TrustLevel::from_score(59), TrustLevel::Established);
        assert_eq!(TrustLevel::from_score(60), TrustLevel::Trusted);
        assert_eq!(TrustLevel::from_score(84), TrustLevel::Trusted);
        assert_eq!(TrustLevel::from_score(85), TrustLevel::Excellent);
        assert_eq!(TrustLevel::from_score(100), TrustLevel::Excellent);
    }
}
