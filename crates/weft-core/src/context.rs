// crates/weft-core/src/context.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{TenantId, UserId};

/// Explicit per-request context, passed into every engine operation.
///
/// Nothing in the engine reads ambient session state: caller identity and
/// the correlation id travel with the request itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The tenant the request originates from.
    pub caller_tenant_id: TenantId,
    /// The user acting, when the operation is on behalf of one.
    pub caller_user_id: Option<UserId>,
    /// Correlation id for logging and idempotency.
    pub request_id: Uuid,
}

impl RequestContext {
    /// A context for a tenant-level operation with no acting user.
    pub fn new(caller_tenant_id: TenantId) -> Self {
        Self {
            caller_tenant_id,
            caller_user_id: None,
            request_id: Uuid::new_v4(),
        }
    }

    /// A context for an operation on behalf of a user.
    pub fn for_user(caller_tenant_id: TenantId, caller_user_id: UserId) -> Self {
        Self {
            caller_tenant_id,
            caller_user_id: Some(caller_user_id),
            request_id: Uuid::new_v4(),
        }
    }
}
