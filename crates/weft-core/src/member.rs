// crates/weft-core/src/member.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TenantId, UserId};

/// A user's federation privacy level. Ordered: each level's exposed-field
/// set is a strict superset of the previous one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    /// Discoverable only: name, avatar, bio, service reach.
    Discovery,
    /// Adds location, skills, and messaging.
    Social,
    /// Adds time-credit transactions.
    Economic,
}

/// How far a member is willing to provide services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceReach {
    LocalOnly,
    WillTravel,
    RemoteOk,
}

/// A field of a member profile that privacy gating can expose or withhold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberField {
    Name,
    Avatar,
    Bio,
    ServiceReach,
    Location,
    Skills,
    Messaging,
    Transactions,
}

/// The set of member fields a viewer is entitled to see.
pub type FieldSet = HashSet<MemberField>;

/// Per-user federation settings. One row per user; everything defaults to
/// off — a user who never touched the settings is invisible to partners.
///
/// The visibility toggles may further restrict, never expand, what the
/// privacy level allows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFederationSettings {
    pub user_id: UserId,
    /// Master opt-in. Without it nothing is exposed, regardless of the rest.
    pub opted_in: bool,
    pub privacy_level: PrivacyLevel,
    pub service_reach: ServiceReach,
    pub show_location: bool,
    pub show_skills: bool,
    pub allow_messaging: bool,
    pub allow_transactions: bool,
    /// Set the first time `opted_in` flips true.
    pub opted_in_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserFederationSettings {
    /// The default (fully private) settings row for a user.
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            opted_in: false,
            privacy_level: PrivacyLevel::Discovery,
            service_reach: ServiceReach::LocalOnly,
            show_location: false,
            show_skills: false,
            allow_messaging: false,
            allow_transactions: false,
            opted_in_at: None,
            updated_at: Utc::now(),
        }
    }
}

/// A member profile as seen across a tenant boundary.
///
/// This is a projection, not a stored entity: every optional field is
/// omitted or cleared per the privacy gate's decision at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedMember {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub service_reach: Option<ServiceReach>,
    pub messaging_enabled: bool,
    pub transactions_enabled: bool,
}

/// The wire record exchanged between partner tenants: the raw member
/// projection together with the owner's federation settings, so the
/// consuming side can apply its own privacy gating before display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerMember {
    pub profile: FederatedMember,
    pub settings: UserFederationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privacy_levels_are_ordered() {
        assert!(PrivacyLevel::Discovery < PrivacyLevel::Social);
        assert!(PrivacyLevel::Social < PrivacyLevel::Economic);
    }

    #[test]
    fn default_settings_are_fully_private() {
        let s = UserFederationSettings::defaults_for(42);
        assert!(!s.opted_in);
        assert_eq!(s.privacy_level, PrivacyLevel::Discovery);
        assert_eq!(s.service_reach, ServiceReach::LocalOnly);
        assert!(!s.show_location && !s.show_skills);
        assert!(!s.allow_messaging && !s.allow_transactions);
        assert!(s.opted_in_at.is_none());
    }
}
