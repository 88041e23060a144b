// crates/weft-core/src/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exchange::TransactionStatus;
use crate::{EntryId, TenantId, UserId};

/// The three origin streams the activity aggregator merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOrigin {
    Messages,
    Transactions,
    Partnerships,
}

impl ActivityOrigin {
    pub const ALL: [ActivityOrigin; 3] = [
        ActivityOrigin::Messages,
        ActivityOrigin::Transactions,
        ActivityOrigin::Partnerships,
    ];
}

/// Direction of a message relative to the feed owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Inbound,
    Outbound,
}

/// Direction of a time-credit transfer relative to the feed owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Sent,
    Received,
}

/// Type-specific payload of an activity entry. The three kinds are fixed
/// and exhaustively handled in merging and stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActivityPayload {
    Message {
        counterparty_user_id: UserId,
        counterparty_tenant_id: TenantId,
        counterparty_name: String,
        direction: FlowDirection,
        preview: String,
    },
    Transaction {
        counterparty_user_id: UserId,
        counterparty_tenant_id: TenantId,
        counterparty_name: String,
        direction: TransferDirection,
        hours: f64,
        status: TransactionStatus,
    },
    NewPartner {
        partner_tenant_id: TenantId,
        partner_name: String,
    },
}

impl ActivityPayload {
    /// The origin stream this payload belongs to.
    pub fn origin(&self) -> ActivityOrigin {
        match self {
            ActivityPayload::Message { .. } => ActivityOrigin::Messages,
            ActivityPayload::Transaction { .. } => ActivityOrigin::Transactions,
            ActivityPayload::NewPartner { .. } => ActivityOrigin::Partnerships,
        }
    }
}

/// One entry in a user's activity feed.
///
/// Immutable once appended, except for `read`, which is mutated only by
/// the owning user — the feed is strictly per-owner, so there is no
/// cross-user write contention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: EntryId,
    pub owner_user_id: UserId,
    pub occurred_at: DateTime<Utc>,
    pub read: bool,
    pub payload: ActivityPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_origin_covers_all_kinds() {
        let message = ActivityPayload::Message {
            counterparty_user_id: 1,
            counterparty_tenant_id: 1,
            counterparty_name: "A".to_string(),
            direction: FlowDirection::Inbound,
            preview: String::new(),
        };
        let transfer = ActivityPayload::Transaction {
            counterparty_user_id: 1,
            counterparty_tenant_id: 1,
            counterparty_name: "A".to_string(),
            direction: TransferDirection::Sent,
            hours: 1.0,
            status: TransactionStatus::Completed,
        };
        let partner = ActivityPayload::NewPartner {
            partner_tenant_id: 2,
            partner_name: "B".to_string(),
        };
        assert_eq!(message.origin(), ActivityOrigin::Messages);
        assert_eq!(transfer.origin(), ActivityOrigin::Transactions);
        assert_eq!(partner.origin(), ActivityOrigin::Partnerships);
    }
}
