// crates/weft-core/src/traits.rs

use async_trait::async_trait;

use crate::activity::{ActivityEntry, ActivityOrigin};
use crate::context::RequestContext;
use crate::error::WeftError;
use crate::exchange::{Review, Transaction, TrustScore};
use crate::member::{PartnerMember, UserFederationSettings};
use crate::resource::{FederatedEvent, FederatedGroup, FederatedListing};
use crate::search::SearchFilters;
use crate::tenant::Partnership;
use crate::{EntryId, ReviewId, TenantId, TransactionId, UserId};

/// Uniform interface to one partner tenant's directory.
///
/// One implementation exists per partner (HTTP in production, in-memory
/// for tests). Calls are bounded by the caller's timeout and cancellation;
/// implementations perform tenant-local filtering themselves, since each
/// tenant owns its data (the push-down).
#[async_trait]
pub trait TenantClient: Send + Sync {
    /// The tenant this client reaches.
    fn tenant_id(&self) -> TenantId;

    /// Fetch member projections matching the filters, with the owners'
    /// federation settings attached for consumer-side gating.
    async fn fetch_members(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<PartnerMember>, WeftError>;

    async fn fetch_listings(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedListing>, WeftError>;

    async fn fetch_events(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedEvent>, WeftError>;

    async fn fetch_groups(
        &self,
        filters: &SearchFilters,
        ctx: &RequestContext,
    ) -> Result<Vec<FederatedGroup>, WeftError>;

    /// Distinct skill tokens starting with the given prefix, for
    /// autocomplete. Case-insensitive.
    async fn fetch_skills(
        &self,
        prefix: &str,
        ctx: &RequestContext,
    ) -> Result<Vec<String>, WeftError>;
}

/// Persistent storage for partnerships. One row per unordered tenant pair.
#[async_trait]
pub trait PartnershipStore: Send + Sync {
    /// Save a partnership. Overwrites the row for the same tenant pair.
    async fn save_partnership(&self, partnership: &Partnership) -> Result<(), WeftError>;

    /// Look up the partnership between two tenants, in either order.
    async fn get_partnership(
        &self,
        a: TenantId,
        b: TenantId,
    ) -> Result<Option<Partnership>, WeftError>;

    /// All partnerships involving the given tenant, any status.
    async fn list_partnerships_for(&self, tenant: TenantId) -> Result<Vec<Partnership>, WeftError>;
}

/// Persistent storage for per-user federation settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The settings row for a user, if one exists. Callers treat a missing
    /// row as `UserFederationSettings::defaults_for` (fully private).
    async fn get_settings(&self, user: UserId)
        -> Result<Option<UserFederationSettings>, WeftError>;

    async fn save_settings(&self, settings: &UserFederationSettings) -> Result<(), WeftError>;
}

/// Append-only storage for activity feed entries. The `read` flag is the
/// only mutable column.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Append an entry, assigning its id. The id on the passed entry is
    /// ignored; the assigned id is returned.
    async fn append_entry(&self, entry: &ActivityEntry) -> Result<EntryId, WeftError>;

    /// All entries of one origin stream owned by the given user.
    async fn entries_for(
        &self,
        owner: UserId,
        origin: ActivityOrigin,
    ) -> Result<Vec<ActivityEntry>, WeftError>;

    /// Mark an entry read. Returns false when no entry with that id is
    /// owned by the given user.
    async fn mark_read(&self, id: EntryId, owner: UserId) -> Result<bool, WeftError>;
}

/// Append-only storage for reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Append a review, assigning its id.
    async fn save_review(&self, review: &Review) -> Result<ReviewId, WeftError>;

    /// The review a given reviewer left for a given transaction, if any.
    async fn find_review(
        &self,
        transaction_id: TransactionId,
        reviewer: UserId,
    ) -> Result<Option<Review>, WeftError>;

    /// All reviews received by the given member.
    async fn reviews_for(&self, reviewee: UserId) -> Result<Vec<Review>, WeftError>;
}

/// Storage for time-credit transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, WeftError>;

    async fn save_transaction(&self, transaction: &Transaction) -> Result<(), WeftError>;

    /// All transactions the given user is a party to.
    async fn transactions_for(&self, user: UserId) -> Result<Vec<Transaction>, WeftError>;
}

/// Storage for cached trust scores. One row per member.
#[async_trait]
pub trait TrustScoreStore: Send + Sync {
    async fn get_score(&self, member: UserId) -> Result<Option<TrustScore>, WeftError>;

    async fn save_score(&self, score: &TrustScore) -> Result<(), WeftError>;
}
