// crates/weft-store/src/memory.rs
//
// In-memory implementations of the weft-core store traits.
//
// Backed by std RwLock<HashMap> maps. These are the reference backends for
// unit tests and for embedding the engine without a RocksDB directory;
// production deployments use `rocks::RocksStore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use weft_core::{
    ActivityEntry, ActivityOrigin, ActivityStore, EntryId, Partnership, PartnershipStore, Review,
    ReviewId, ReviewStore, SettingsStore, TenantId, Transaction, TransactionId, TransactionStore,
    TrustScore, TrustScoreStore, UserFederationSettings, UserId, WeftError,
};

fn poisoned(e: impl std::fmt::Display) -> WeftError {
    WeftError::Store(format!("RwLock poisoned: {}", e))
}

/// In-memory partnership store, keyed by the normalized tenant pair.
#[derive(Debug, Default)]
pub struct MemoryPartnershipStore {
    rows: RwLock<HashMap<(TenantId, TenantId), Partnership>>,
}

impl MemoryPartnershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartnershipStore for MemoryPartnershipStore {
    async fn save_partnership(&self, partnership: &Partnership) -> Result<(), WeftError> {
        let key = Partnership::key(partnership.a_tenant, partnership.b_tenant);
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(key, partnership.clone());
        Ok(())
    }

    async fn get_partnership(
        &self,
        a: TenantId,
        b: TenantId,
    ) -> Result<Option<Partnership>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&Partnership::key(a, b)).cloned())
    }

    async fn list_partnerships_for(&self, tenant: TenantId) -> Result<Vec<Partnership>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut found: Vec<Partnership> =
            rows.values().filter(|p| p.involves(tenant)).cloned().collect();
        found.sort_by_key(|p| Partnership::key(p.a_tenant, p.b_tenant));
        Ok(found)
    }
}

/// In-memory user federation settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    rows: RwLock<HashMap<UserId, UserFederationSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_settings(
        &self,
        user: UserId,
    ) -> Result<Option<UserFederationSettings>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&user).cloned())
    }

    async fn save_settings(&self, settings: &UserFederationSettings) -> Result<(), WeftError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(settings.user_id, settings.clone());
        Ok(())
    }
}

/// In-memory append-only activity store.
#[derive(Debug, Default)]
pub struct MemoryActivityStore {
    rows: RwLock<HashMap<EntryId, ActivityEntry>>,
    next_id: AtomicU64,
}

impl MemoryActivityStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ActivityStore for MemoryActivityStore {
    async fn append_entry(&self, entry: &ActivityEntry) -> Result<EntryId, WeftError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = entry.clone();
        stored.id = id;
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(id, stored);
        Ok(id)
    }

    async fn entries_for(
        &self,
        owner: UserId,
        origin: ActivityOrigin,
    ) -> Result<Vec<ActivityEntry>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut found: Vec<ActivityEntry> = rows
            .values()
            .filter(|e| e.owner_user_id == owner && e.payload.origin() == origin)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        Ok(found)
    }

    async fn mark_read(&self, id: EntryId, owner: UserId) -> Result<bool, WeftError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        match rows.get_mut(&id) {
            Some(entry) if entry.owner_user_id == owner => {
                entry.read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory append-only review store.
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    rows: RwLock<HashMap<ReviewId, Review>>,
    next_id: AtomicU64,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn save_review(&self, review: &Review) -> Result<ReviewId, WeftError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = review.clone();
        stored.id = id;
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(id, stored);
        Ok(id)
    }

    async fn find_review(
        &self,
        transaction_id: TransactionId,
        reviewer: UserId,
    ) -> Result<Option<Review>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .values()
            .find(|r| r.transaction_id == transaction_id && r.reviewer_user_id == reviewer)
            .cloned())
    }

    async fn reviews_for(&self, reviewee: UserId) -> Result<Vec<Review>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut found: Vec<Review> = rows
            .values()
            .filter(|r| r.reviewee_user_id == reviewee)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }
}

/// In-memory transaction store.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    rows: RwLock<HashMap<TransactionId, Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&id).cloned())
    }

    async fn save_transaction(&self, transaction: &Transaction) -> Result<(), WeftError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn transactions_for(&self, user: UserId) -> Result<Vec<Transaction>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let mut found: Vec<Transaction> =
            rows.values().filter(|t| t.is_party(user)).cloned().collect();
        found.sort_by_key(|t| t.id);
        Ok(found)
    }
}

/// In-memory cached trust score store.
#[derive(Debug, Default)]
pub struct MemoryTrustScoreStore {
    rows: RwLock<HashMap<UserId, TrustScore>>,
}

impl MemoryTrustScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrustScoreStore for MemoryTrustScoreStore {
    async fn get_score(&self, member: UserId) -> Result<Option<TrustScore>, WeftError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.get(&member).cloned())
    }

    async fn save_score(&self, score: &TrustScore) -> Result<(), WeftError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(score.member_id, score.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weft_core::{ActivityPayload, FlowDirection};

    fn message_entry(owner: UserId) -> ActivityEntry {
        ActivityEntry {
            id: 0,
            owner_user_id: owner,
            occurred_at: Utc::now(),
            read: false,
            payload: ActivityPayload::Message {
                counterparty_user_id: 99,
                counterparty_tenant_id: 2,
                counterparty_name: "Robin".to_string(),
                direction: FlowDirection::Inbound,
                preview: "hello".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn activity_append_assigns_increasing_ids() {
        let store = MemoryActivityStore::new();
        let first = store.append_entry(&message_entry(1)).await.unwrap();
        let second = store.append_entry(&message_entry(1)).await.unwrap();
        assert!(second > first);

        let entries = store.entries_for(1, ActivityOrigin::Messages).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(store
            .entries_for(1, ActivityOrigin::Transactions)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn mark_read_is_owner_checked() {
        let store = MemoryActivityStore::new();
        let id = store.append_entry(&message_entry(1)).await.unwrap();

        assert!(!store.mark_read(id, 2).await.unwrap());
        assert!(store.mark_read(id, 1).await.unwrap());
        let entries = store.entries_for(1, ActivityOrigin::Messages).await.unwrap();
        assert!(entries[0].read);
    }

    #[tokio::test]
    async fn partnership_lookup_is_order_independent() {
        let store = MemoryPartnershipStore::new();
        let p = Partnership {
            a_tenant: 1,
            b_tenant: 2,
            status: weft_core::PartnershipStatus::Active,
            since: Utc::now(),
            a_features: weft_core::FeatureSet::all(),
            b_features: weft_core::FeatureSet::all(),
        };
        store.save_partnership(&p).await.unwrap();

        assert!(store.get_partnership(2, 1).await.unwrap().is_some());
        assert_eq!(store.list_partnerships_for(2).await.unwrap().len(), 1);
        assert!(store.list_partnerships_for(3).await.unwrap().is_empty());
    }
}
