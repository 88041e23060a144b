// crates/weft-federation/src/lib.rs
//
// weft-federation: Cross-tenant discovery for the Weft federation engine.
//
// Holds the partnership registry (which tenants may see what), the privacy
// gate (which fields of whom), the tenant-client implementations (how to
// reach a partner), and the federated query router that fans a single
// logical search out across all eligible partners, merges, and paginates.

pub mod client;
pub mod filters;
pub mod privacy;
pub mod registry;
pub mod router;

// Re-export key types for ergonomic access from downstream crates.
pub use client::{HttpTenantClient, StaticTenantClient};
pub use registry::TenantPartnershipRegistry;
pub use router::{
    CancelToken, FederatedQueryRouter, RouterConfig, SearchOutcome, SearchSessions,
};
