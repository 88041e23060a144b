// crates/weft-store/src/lib.rs
//
// weft-store: Storage layer for the Weft federation engine.
//
// Provides a RocksDB-backed implementation of every persistence trait in
// weft-core (partnerships, user federation settings, activity entries,
// reviews, transactions, cached trust scores) plus in-memory reference
// implementations used by tests and embedding callers.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::{
    MemoryActivityStore, MemoryPartnershipStore, MemoryReviewStore, MemorySettingsStore,
    MemoryTransactionStore, MemoryTrustScoreStore,
};
pub use rocks::RocksStore;
