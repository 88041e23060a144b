// crates/weft-rpc/src/handlers/activity.rs
//
// Activity feed and read-state handlers.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use weft_activity::{ActivityAggregator, ActivityFilter, FeedStats};
use weft_core::{ActivityEntry, ActivityOrigin, EntryId, UserId};

/// Request for `activity/feed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRequest {
    pub owner_id: UserId,
    #[serde(default)]
    pub origin: Option<ActivityOrigin>,
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One feed entry with its display timestamp attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntryView {
    #[serde(flatten)]
    pub entry: ActivityEntry,
    /// "Just now", "5m ago", ... or an absolute short date.
    pub relative_time: String,
}

/// Response for `activity/feed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub entries: Vec<FeedEntryView>,
    pub stats: FeedStats,
    /// True when an origin stream was unavailable and the feed is partial.
    pub partial: bool,
}

/// Handle an activity feed request.
pub async fn handle_feed(
    aggregator: &ActivityAggregator,
    request: FeedRequest,
) -> Result<FeedResponse, String> {
    let filter = ActivityFilter {
        origin: request.origin,
        unread_only: request.unread_only,
        limit: request.limit,
    };
    let feed = aggregator
        .feed(request.owner_id, &filter)
        .await
        .map_err(|e| e.to_string())?;

    let now = Utc::now();
    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let relative_time = weft_activity::format_relative(entry.occurred_at, now);
            FeedEntryView {
                entry,
                relative_time,
            }
        })
        .collect();

    Ok(FeedResponse {
        entries,
        stats: feed.stats,
        partial: feed.partial,
    })
}

/// Request for `activity/mark_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub entry_id: EntryId,
    pub owner_id: UserId,
}

/// Response for `activity/mark_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: bool,
}

/// Handle marking one entry read.
pub async fn handle_mark_read(
    aggregator: &ActivityAggregator,
    request: MarkReadRequest,
) -> Result<MarkReadResponse, String> {
    aggregator
        .mark_read(request.entry_id, request.owner_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(MarkReadResponse { updated: true })
}
