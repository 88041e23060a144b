// crates/weft-reputation/src/lib.rs
//
// weft-reputation: Trust scoring and reviews for the Weft federation engine.
//
// Computes a 0-100 reputation score per member from weak signals (review
// average and volume, completed transactions, cross-tenant activity),
// caches it with a staleness bound, and manages review eligibility and
// submission. A new review triggers an asynchronous recompute of the
// reviewee's score.

pub mod reviews;
pub mod trust;

// Re-export key types for ergonomic access from downstream crates.
pub use reviews::ReviewSubsystem;
pub use trust::{TrustConfig, TrustScoreEngine, TrustWeights};
