// crates/weft-store/src/rocks.rs
//
// RocksDB-backed persistence for the Weft federation engine.
//
// One database holds every concern, namespaced by key prefix:
//   - `partnership:{lo}:{hi}`                         -> JSON Partnership
//   - `partnership_by_tenant:{tenant}:{lo}:{hi}`      -> empty (index only)
//   - `settings:{user}`                               -> JSON UserFederationSettings
//   - `activity:{id}`                                 -> JSON ActivityEntry
//   - `activity_by_owner:{owner}:{origin}:{id}`       -> empty (index only)
//   - `review:{id}`                                   -> JSON Review
//   - `review_by_txn:{txn}:{reviewer}`                -> review id (direct lookup)
//   - `review_by_reviewee:{reviewee}:{id}`            -> empty (index only)
//   - `txn:{id}`                                      -> JSON Transaction
//   - `txn_by_user:{user}:{id}`                       -> empty (index only)
//   - `trust:{member}`                                -> JSON TrustScore
//
// Numeric id components are zero-padded to 20 digits so prefix iteration
// yields them in id order. Secondary index entries carry no payload —
// existence is the signal — except `review_by_txn`, whose value is the
// review id for a single-get duplicate check.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use weft_core::{
    ActivityEntry, ActivityOrigin, ActivityStore, EntryId, Partnership, PartnershipStore, Review,
    ReviewId, ReviewStore, SettingsStore, TenantId, Transaction, TransactionId, TransactionStore,
    TrustScore, TrustScoreStore, UserFederationSettings, UserId, WeftError,
};

/// RocksDB wrapper implementing every weft-core store trait.
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
    next_entry_id: AtomicU64,
    next_review_id: AtomicU64,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore").finish()
    }
}

/// Zero-pad a numeric id for use in ordered keys.
fn pad(id: u64) -> String {
    format!("{:020}", id)
}

/// Stable tag for an activity origin, used in index keys.
fn origin_tag(origin: ActivityOrigin) -> &'static str {
    match origin {
        ActivityOrigin::Messages => "messages",
        ActivityOrigin::Transactions => "transactions",
        ActivityOrigin::Partnerships => "partnerships",
    }
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist, and restores
    /// the id sequences from their persisted values.
    pub fn open(path: &str) -> Result<Self, WeftError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| WeftError::Store(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        let next_entry_id = AtomicU64::new(Self::load_sequence(&db, b"seq:activity")?);
        let next_review_id = AtomicU64::new(Self::load_sequence(&db, b"seq:review")?);

        Ok(Self {
            db,
            next_entry_id,
            next_review_id,
        })
    }

    fn load_sequence(
        db: &DBWithThreadMode<MultiThreaded>,
        key: &[u8],
    ) -> Result<u64, WeftError> {
        let stored = db
            .get(key)
            .map_err(|e| WeftError::Store(format!("RocksDB get failed: {}", e)))?;
        match stored {
            Some(bytes) => {
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| WeftError::Store(format!("Corrupt sequence value: {}", e)))?;
                text.parse::<u64>()
                    .map_err(|e| WeftError::Store(format!("Corrupt sequence value: {}", e)))
            }
            None => Ok(1),
        }
    }

    /// Allocate the next id from a sequence and persist the new high water mark.
    fn next_id(&self, counter: &AtomicU64, seq_key: &[u8]) -> Result<u64, WeftError> {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        self.put_raw(seq_key, (id + 1).to_string().as_bytes())?;
        Ok(id)
    }

    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), WeftError> {
        self.db
            .put(key, value)
            .map_err(|e| WeftError::Store(format!("RocksDB put failed: {}", e)))
    }

    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, WeftError> {
        self.db
            .get(key)
            .map_err(|e| WeftError::Store(format!("RocksDB get failed: {}", e)))
    }

    /// Fetch and JSON-decode a row.
    fn get_row<T: serde::de::DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, WeftError> {
        match self.get_raw(key)? {
            Some(bytes) => {
                let row = serde_json::from_slice(&bytes)?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// JSON-encode and store a row.
    fn put_row<T: serde::Serialize>(&self, key: &[u8], row: &T) -> Result<(), WeftError> {
        let json = serde_json::to_vec(row)?;
        self.put_raw(key, &json)
    }

    /// Collect the id suffixes of every index key under a prefix, in order.
    fn scan_index_ids(&self, prefix: &str) -> Result<Vec<u64>, WeftError> {
        let prefix_bytes = prefix.as_bytes();
        let mut ids = Vec::new();

        let iter = self.db.prefix_iterator(prefix_bytes);
        for item in iter {
            let (key, _value) =
                item.map_err(|e| WeftError::Store(format!("RocksDB iteration error: {}", e)))?;
            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix_bytes) {
                break;
            }
            let suffix = &key[prefix_bytes.len()..];
            if let Ok(text) = std::str::from_utf8(suffix) {
                if let Ok(id) = text.parse::<u64>() {
                    ids.push(id);
                }
            }
        }

        Ok(ids)
    }

    // Key builders.

    fn partnership_key(a: TenantId, b: TenantId) -> Vec<u8> {
        let (lo, hi) = Partnership::key(a, b);
        format!("partnership:{}:{}", pad(lo), pad(hi)).into_bytes()
    }

    fn partnership_index_key(tenant: TenantId, a: TenantId, b: TenantId) -> Vec<u8> {
        let (lo, hi) = Partnership::key(a, b);
        format!("partnership_by_tenant:{}:{}:{}", pad(tenant), pad(lo), pad(hi)).into_bytes()
    }

    fn settings_key(user: UserId) -> Vec<u8> {
        format!("settings:{}", pad(user)).into_bytes()
    }

    fn activity_key(id: EntryId) -> Vec<u8> {
        format!("activity:{}", pad(id)).into_bytes()
    }

    fn activity_index_prefix(owner: UserId, origin: ActivityOrigin) -> String {
        format!("activity_by_owner:{}:{}:", pad(owner), origin_tag(origin))
    }

    fn review_key(id: ReviewId) -> Vec<u8> {
        format!("review:{}", pad(id)).into_bytes()
    }

    fn review_txn_key(transaction_id: TransactionId, reviewer: UserId) -> Vec<u8> {
        format!("review_by_txn:{}:{}", pad(transaction_id), pad(reviewer)).into_bytes()
    }

    fn review_reviewee_prefix(reviewee: UserId) -> String {
        format!("review_by_reviewee:{}:", pad(reviewee))
    }

    fn txn_key(id: TransactionId) -> Vec<u8> {
        format!("txn:{}", pad(id)).into_bytes()
    }

    fn txn_user_prefix(user: UserId) -> String {
        format!("txn_by_user:{}:", pad(user))
    }

    fn trust_key(member: UserId) -> Vec<u8> {
        format!("trust:{}", pad(member)).into_bytes()
    }
}

#[async_trait]
impl PartnershipStore for RocksStore {
    async fn save_partnership(&self, partnership: &Partnership) -> Result<(), WeftError> {
        self.put_row(
            &Self::partnership_key(partnership.a_tenant, partnership.b_tenant),
            partnership,
        )?;
        // Index the row under both sides of the pair.
        for tenant in [partnership.a_tenant, partnership.b_tenant] {
            self.put_raw(
                &Self::partnership_index_key(tenant, partnership.a_tenant, partnership.b_tenant),
                &[],
            )?;
        }
        Ok(())
    }

    async fn get_partnership(
        &self,
        a: TenantId,
        b: TenantId,
    ) -> Result<Option<Partnership>, WeftError> {
        self.get_row(&Self::partnership_key(a, b))
    }

    async fn list_partnerships_for(&self, tenant: TenantId) -> Result<Vec<Partnership>, WeftError> {
        let prefix = format!("partnership_by_tenant:{}:", pad(tenant));
        let prefix_bytes = prefix.as_bytes();
        let mut found = Vec::new();

        let iter = self.db.prefix_iterator(prefix_bytes);
        for item in iter {
            let (key, _value) =
                item.map_err(|e| WeftError::Store(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(prefix_bytes) {
                break;
            }
            // Suffix is `{lo}:{hi}`; reuse it to build the primary key.
            let suffix = &key[prefix_bytes.len()..];
            if let Ok(pair) = std::str::from_utf8(suffix) {
                let primary = format!("partnership:{}", pair).into_bytes();
                if let Some(partnership) = self.get_row::<Partnership>(&primary)? {
                    found.push(partnership);
                }
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl SettingsStore for RocksStore {
    async fn get_settings(
        &self,
        user: UserId,
    ) -> Result<Option<UserFederationSettings>, WeftError> {
        self.get_row(&Self::settings_key(user))
    }

    async fn save_settings(&self, settings: &UserFederationSettings) -> Result<(), WeftError> {
        self.put_row(&Self::settings_key(settings.user_id), settings)
    }
}

#[async_trait]
impl ActivityStore for RocksStore {
    async fn append_entry(&self, entry: &ActivityEntry) -> Result<EntryId, WeftError> {
        let id = self.next_id(&self.next_entry_id, b"seq:activity")?;
        let mut stored = entry.clone();
        stored.id = id;

        self.put_row(&Self::activity_key(id), &stored)?;
        let index = format!(
            "{}{}",
            Self::activity_index_prefix(stored.owner_user_id, stored.payload.origin()),
            pad(id)
        );
        self.put_raw(index.as_bytes(), &[])?;
        Ok(id)
    }

    async fn entries_for(
        &self,
        owner: UserId,
        origin: ActivityOrigin,
    ) -> Result<Vec<ActivityEntry>, WeftError> {
        let ids = self.scan_index_ids(&Self::activity_index_prefix(owner, origin))?;
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entry) = self.get_row::<ActivityEntry>(&Self::activity_key(id))? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn mark_read(&self, id: EntryId, owner: UserId) -> Result<bool, WeftError> {
        let key = Self::activity_key(id);
        match self.get_row::<ActivityEntry>(&key)? {
            Some(mut entry) if entry.owner_user_id == owner => {
                entry.read = true;
                self.put_row(&key, &entry)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReviewStore for RocksStore {
    async fn save_review(&self, review: &Review) -> Result<ReviewId, WeftError> {
        let id = self.next_id(&self.next_review_id, b"seq:review")?;
        let mut stored = review.clone();
        stored.id = id;

        self.put_row(&Self::review_key(id), &stored)?;
        self.put_raw(
            &Self::review_txn_key(stored.transaction_id, stored.reviewer_user_id),
            pad(id).as_bytes(),
        )?;
        let reviewee_index = format!(
            "{}{}",
            Self::review_reviewee_prefix(stored.reviewee_user_id),
            pad(id)
        );
        self.put_raw(reviewee_index.as_bytes(), &[])?;
        Ok(id)
    }

    async fn find_review(
        &self,
        transaction_id: TransactionId,
        reviewer: UserId,
    ) -> Result<Option<Review>, WeftError> {
        let id_bytes = match self.get_raw(&Self::review_txn_key(transaction_id, reviewer))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let id = std::str::from_utf8(&id_bytes)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| WeftError::Store("Corrupt review index value".to_string()))?;
        self.get_row(&Self::review_key(id))
    }

    async fn reviews_for(&self, reviewee: UserId) -> Result<Vec<Review>, WeftError> {
        let ids = self.scan_index_ids(&Self::review_reviewee_prefix(reviewee))?;
        let mut reviews = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(review) = self.get_row::<Review>(&Self::review_key(id))? {
                reviews.push(review);
            }
        }
        Ok(reviews)
    }
}

#[async_trait]
impl TransactionStore for RocksStore {
    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, WeftError> {
        self.get_row(&Self::txn_key(id))
    }

    async fn save_transaction(&self, transaction: &Transaction) -> Result<(), WeftError> {
        self.put_row(&Self::txn_key(transaction.id), transaction)?;
        for user in [transaction.sender_user_id, transaction.receiver_user_id] {
            let index = format!("{}{}", Self::txn_user_prefix(user), pad(transaction.id));
            self.put_raw(index.as_bytes(), &[])?;
        }
        Ok(())
    }

    async fn transactions_for(&self, user: UserId) -> Result<Vec<Transaction>, WeftError> {
        let ids = self.scan_index_ids(&Self::txn_user_prefix(user))?;
        let mut transactions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(transaction) = self.get_row::<Transaction>(&Self::txn_key(id))? {
                transactions.push(transaction);
            }
        }
        Ok(transactions)
    }
}

#[async_trait]
impl TrustScoreStore for RocksStore {
    async fn get_score(&self, member: UserId) -> Result<Option<TrustScore>, WeftError> {
        self.get_row(&Self::trust_key(member))
    }

    async fn save_score(&self, score: &TrustScore) -> Result<(), WeftError> {
        self.put_row(&Self::trust_key(score.member_id), score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_zero_padded_and_order_normalized() {
        assert_eq!(
            RocksStore::partnership_key(7, 3),
            RocksStore::partnership_key(3, 7)
        );
        let key = String::from_utf8(RocksStore::partnership_key(3, 7)).unwrap();
        assert_eq!(
            key,
            format!("partnership:{:020}:{:020}", 3, 7)
        );
    }

    #[test]
    fn index_prefixes_embed_origin_tags() {
        assert_eq!(
            RocksStore::activity_index_prefix(5, ActivityOrigin::Messages),
            format!("activity_by_owner:{:020}:messages:", 5)
        );
        assert_eq!(origin_tag(ActivityOrigin::Transactions), "transactions");
        assert_eq!(origin_tag(ActivityOrigin::Partnerships), "partnerships");
    }

    #[test]
    fn review_txn_key_is_per_reviewer() {
        let first = RocksStore::review_txn_key(10, 1);
        let second = RocksStore::review_txn_key(10, 2);
        assert_ne!(first, second);
    }
}
