// crates/weft-core/src/lib.rs
//
// weft-core: Core types, traits, and errors for the Weft federation engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the canonical data structures, the workspace error type, and
// the trait interfaces (tenant client, persistence stores) used throughout
// the cross-tenant aggregation and trust engine.

pub mod activity;
pub mod context;
pub mod error;
pub mod exchange;
pub mod member;
pub mod resource;
pub mod search;
pub mod tenant;
pub mod traits;

/// Identifier of a tenant (one autonomous timebank community).
pub type TenantId = u64;
/// Identifier of a user within the federation.
pub type UserId = u64;
/// Identifier of a tenant-local record (listing, event, group).
pub type RecordId = u64;
/// Identifier of an activity feed entry.
pub type EntryId = u64;
/// Identifier of a time-credit transaction.
pub type TransactionId = u64;
/// Identifier of a review.
pub type ReviewId = u64;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use weft_core::Partnership;`

// Tenant types
pub use tenant::{FeatureSet, FederationFeature, Partnership, PartnershipStatus, Tenant};

// Member types
pub use member::{
    FederatedMember, FieldSet, MemberField, PartnerMember, PrivacyLevel, ServiceReach,
    UserFederationSettings,
};

// Resource types
pub use resource::{
    FederatedEvent, FederatedGroup, FederatedListing, FederatedRecord, ListingKind, ResourceKind,
};

// Search types
pub use search::{PageCursor, SearchFilters, SortOrder};

// Activity types
pub use activity::{ActivityEntry, ActivityOrigin, ActivityPayload, FlowDirection, TransferDirection};

// Exchange types
pub use exchange::{
    Review, ReviewStats, Transaction, TransactionStatus, TrustComponents, TrustDetails, TrustLevel,
    TrustScore, MAX_REVIEW_COMMENT_CHARS,
};

// Request context
pub use context::RequestContext;

// Error type
pub use error::WeftError;

// Traits
pub use traits::{
    ActivityStore, PartnershipStore, ReviewStore, SettingsStore, TenantClient, TransactionStore,
    TrustScoreStore,
};
