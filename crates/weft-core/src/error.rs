// crates/weft-core/src/error.rs

use thiserror::Error;

use crate::TenantId;

/// Engine-wide error types for Weft.
#[derive(Debug, Error)]
pub enum WeftError {
    /// A request carried an invalid value; rejected synchronously with field detail.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The caller attempted an action the privacy gate disallows.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Unknown tenant, transaction, member, or feed entry.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A second review for the same (transaction, reviewer) pair.
    #[error("This exchange has already been reviewed")]
    DuplicateReview,

    /// Review rules violated: transaction incomplete or reviewer not a party.
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// A partner tenant timed out or errored during fan-out. Never surfaced
    /// as a failure of the overall request; the router degrades the merged
    /// result and reports the tenant as not consulted.
    #[error("Partner tenant {0} unavailable")]
    PartnerUnavailable(TenantId),

    /// The request was superseded by a newer one from the same caller session.
    #[error("Request superseded")]
    Cancelled,

    /// Persistence layer error. Fatal to the operation: writes are reported
    /// as retryable, reads never masquerade as empty results.
    #[error("Storage error: {0}")]
    Store(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WeftError {
    /// Shorthand for a `Validation` error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        WeftError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for WeftError {
    fn from(e: serde_json::Error) -> Self {
        WeftError::Serialization(e.to_string())
    }
}
