// crates/weft-activity/src/aggregator.rs
//
// ActivityAggregator: merges the three per-owner origin streams into one
// newest-first feed and computes summary statistics in the same pass.
//
// A temporarily unavailable origin yields a partial feed, flagged rather
// than failed. Statistics always cover the full merged set; the origin and
// unread filters only narrow the entries returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use weft_core::{
    ActivityEntry, ActivityOrigin, ActivityPayload, ActivityStore, EntryId, TransferDirection,
    UserId, WeftError,
};

/// Optional narrowing of a feed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityFilter {
    /// Only entries from one origin stream.
    #[serde(default)]
    pub origin: Option<ActivityOrigin>,
    /// Only unread entries.
    #[serde(default)]
    pub unread_only: bool,
    /// Cap on returned entries (newest first).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Summary statistics over a user's full activity feed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeedStats {
    pub unread: u64,
    pub messages: u64,
    pub transactions: u64,
    pub partner_events: u64,
    pub hours_sent: f64,
    pub hours_received: f64,
}

/// One aggregated feed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFeed {
    pub entries: Vec<ActivityEntry>,
    pub stats: FeedStats,
    /// True when at least one origin stream could not be read; the feed
    /// holds whatever the remaining origins returned.
    pub partial: bool,
}

/// The activity feed aggregator.
pub struct ActivityAggregator {
    store: Arc<dyn ActivityStore>,
}

impl ActivityAggregator {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Build the merged feed for one owner.
    pub async fn feed(
        &self,
        owner: UserId,
        filter: &ActivityFilter,
    ) -> Result<ActivityFeed, WeftError> {
        let mut merged: Vec<ActivityEntry> = Vec::new();
        let mut partial = false;

        for origin in ActivityOrigin::ALL {
            match self.store.entries_for(owner, origin).await {
                Ok(entries) => merged.extend(entries),
                Err(e) => {
                    tracing::warn!(
                        "Activity origin {:?} unavailable for user {}: {}",
                        origin,
                        owner,
                        e
                    );
                    partial = true;
                }
            }
        }

        // Newest first; ties break on id descending so ordering is stable.
        merged.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let mut stats = FeedStats::default();
        for entry in &merged {
            if !entry.read {
                stats.unread += 1;
            }
            match &entry.payload {
                ActivityPayload::Message { .. } => stats.messages += 1,
                ActivityPayload::Transaction {
                    direction, hours, ..
                } => {
                    stats.transactions += 1;
                    match direction {
                        TransferDirection::Sent => stats.hours_sent += hours,
                        TransferDirection::Received => stats.hours_received += hours,
                    }
                }
                ActivityPayload::NewPartner { .. } => stats.partner_events += 1,
            }
        }

        let mut entries = merged;
        if let Some(origin) = filter.origin {
            entries.retain(|e| e.payload.origin() == origin);
        }
        if filter.unread_only {
            entries.retain(|e| !e.read);
        }
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }

        Ok(ActivityFeed {
            entries,
            stats,
            partial,
        })
    }

    /// Mark one entry read. Owner-checked: an entry that does not exist or
    /// belongs to someone else is `NotFound`.
    pub async fn mark_read(&self, id: EntryId, owner: UserId) -> Result<(), WeftError> {
        if self.store.mark_read(id, owner).await? {
            Ok(())
        } else {
            Err(WeftError::NotFound(format!("activity entry {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use weft_core::{FlowDirection, TransactionStatus};
    use weft_store::MemoryActivityStore;

    fn message(owner: UserId, seconds_ago: i64) -> ActivityEntry {
        ActivityEntry {
            id: 0,
            owner_user_id: owner,
            occurred_at: Utc::now() - Duration::seconds(seconds_ago),
            read: false,
            payload: ActivityPayload::Message {
                counterparty_user_id: 9,
                counterparty_tenant_id: 2,
                counterparty_name: "Robin".to_string(),
                direction: FlowDirection::Inbound,
                preview: "hi".to_string(),
            },
        }
    }

    fn transfer(owner: UserId, seconds_ago: i64, direction: TransferDirection, hours: f64) -> ActivityEntry {
        ActivityEntry {
            id: 0,
            owner_user_id: owner,
            occurred_at: Utc::now() - Duration::seconds(seconds_ago),
            read: false,
            payload: ActivityPayload::Transaction {
                counterparty_user_id: 9,
                counterparty_tenant_id: 2,
                counterparty_name: "Robin".to_string(),
                direction,
                hours,
                status: TransactionStatus::Completed,
            },
        }
    }

    fn partner(owner: UserId, seconds_ago: i64) -> ActivityEntry {
        ActivityEntry {
            id: 0,
            owner_user_id: owner,
            occurred_at: Utc::now() - Duration::seconds(seconds_ago),
            read: false,
            payload: ActivityPayload::NewPartner {
                partner_tenant_id: 3,
                partner_name: "Harbour Timebank".to_string(),
            },
        }
    }

    /// Store wrapper that fails one origin, for partial-feed tests.
    struct FlakyStore {
        inner: MemoryActivityStore,
        failing: ActivityOrigin,
    }

    #[async_trait]
    impl ActivityStore for FlakyStore {
        async fn append_entry(&self, entry: &ActivityEntry) -> Result<EntryId, WeftError> {
            self.inner.append_entry(entry).await
        }

        async fn entries_for(
            &self,
            owner: UserId,
            origin: ActivityOrigin,
        ) -> Result<Vec<ActivityEntry>, WeftError> {
            if origin == self.failing {
                return Err(WeftError::Store("origin store offline".to_string()));
            }
            self.inner.entries_for(owner, origin).await
        }

        async fn mark_read(&self, id: EntryId, owner: UserId) -> Result<bool, WeftError> {
            self.inner.mark_read(id, owner).await
        }
    }

    #[tokio::test]
    async fn feed_merges_newest_first_with_id_tiebreak() {
        let store = Arc::new(MemoryActivityStore::new());
        let when = Utc::now() - Duration::seconds(30);
        let mut a = message(1, 0);
        a.occurred_at = when;
        let mut b = partner(1, 0);
        b.occurred_at = when;
        store.append_entry(&a).await.unwrap();
        let second_id = store.append_entry(&b).await.unwrap();
        store.append_entry(&message(1, 600)).await.unwrap();

        let aggregator = ActivityAggregator::new(store);
        let feed = aggregator.feed(1, &ActivityFilter::default()).await.unwrap();

        assert_eq!(feed.entries.len(), 3);
        // The two simultaneous entries lead, higher id first.
        assert_eq!(feed.entries[0].id, second_id);
        assert_eq!(feed.entries[1].occurred_at, when);
        assert!(feed.entries[2].occurred_at < when);
        assert!(!feed.partial);
    }

    #[tokio::test]
    async fn stats_cover_all_origins_in_one_pass() {
        let store = Arc::new(MemoryActivityStore::new());
        store.append_entry(&message(1, 10)).await.unwrap();
        let read_id = store.append_entry(&message(1, 20)).await.unwrap();
        store
            .append_entry(&transfer(1, 30, TransferDirection::Sent, 2.0))
            .await
            .unwrap();
        store
            .append_entry(&transfer(1, 40, TransferDirection::Received, 1.5))
            .await
            .unwrap();
        store.append_entry(&partner(1, 50)).await.unwrap();
        store.mark_read(read_id, 1).await.unwrap();

        let aggregator = ActivityAggregator::new(store);
        let feed = aggregator.feed(1, &ActivityFilter::default()).await.unwrap();

        assert_eq!(feed.stats.messages, 2);
        assert_eq!(feed.stats.transactions, 2);
        assert_eq!(feed.stats.partner_events, 1);
        assert_eq!(feed.stats.unread, 4);
        assert!((feed.stats.hours_sent - 2.0).abs() < 1e-9);
        assert!((feed.stats.hours_received - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unavailable_origin_yields_partial_feed() {
        let inner = MemoryActivityStore::new();
        inner.append_entry(&message(1, 10)).await.unwrap();
        inner.append_entry(&partner(1, 20)).await.unwrap();
        let store = Arc::new(FlakyStore {
            inner,
            failing: ActivityOrigin::Transactions,
        });

        let aggregator = ActivityAggregator::new(store);
        let feed = aggregator.feed(1, &ActivityFilter::default()).await.unwrap();

        assert!(feed.partial);
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.stats.transactions, 0);
    }

    #[tokio::test]
    async fn filters_narrow_entries_but_not_stats() {
        let store = Arc::new(MemoryActivityStore::new());
        store.append_entry(&message(1, 10)).await.unwrap();
        store
            .append_entry(&transfer(1, 20, TransferDirection::Sent, 3.0))
            .await
            .unwrap();

        let aggregator = ActivityAggregator::new(store);
        let filter = ActivityFilter {
            origin: Some(ActivityOrigin::Messages),
            ..ActivityFilter::default()
        };
        let feed = aggregator.feed(1, &filter).await.unwrap();

        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.stats.transactions, 1);
        assert_eq!(feed.stats.messages, 1);
    }

    #[tokio::test]
    async fn mark_read_rejects_foreign_entries() {
        let store = Arc::new(MemoryActivityStore::new());
        let id = store.append_entry(&message(1, 10)).await.unwrap();

        let aggregator = ActivityAggregator::new(store);
        let err = aggregator.mark_read(id, 2).await.unwrap_err();
        assert!(matches!(err, WeftError::NotFound(_)));

        aggregator.mark_read(id, 1).await.unwrap();
        let feed = aggregator.feed(1, &ActivityFilter::default()).await.unwrap();
        assert_eq!(feed.stats.unread, 0);
    }
}
