// crates/weft-rpc/src/handlers/settings.rs
//
// Read and update per-user federation settings. A user with no stored row
// reads as the fully-private defaults. Persistence failures on update are
// fatal to the operation and surface in the envelope.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use weft_core::{
    PrivacyLevel, ServiceReach, SettingsStore, UserFederationSettings, UserId, WeftError,
};

/// Request for `settings/get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSettingsRequest {
    pub user_id: UserId,
}

/// Response carrying the full settings row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: UserFederationSettings,
}

/// Handle a settings read.
pub async fn handle_get_settings(
    store: &dyn SettingsStore,
    request: GetSettingsRequest,
) -> Result<SettingsResponse, String> {
    let settings = store
        .get_settings(request.user_id)
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_else(|| UserFederationSettings::defaults_for(request.user_id));
    Ok(SettingsResponse { settings })
}

/// Request for `settings/update`: the full new state of the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub user_id: UserId,
    pub opted_in: bool,
    pub privacy_level: PrivacyLevel,
    pub service_reach: ServiceReach,
    #[serde(default)]
    pub show_location: bool,
    #[serde(default)]
    pub show_skills: bool,
    #[serde(default)]
    pub allow_messaging: bool,
    #[serde(default)]
    pub allow_transactions: bool,
}

/// Handle a settings update. `opted_in_at` is stamped the first time the
/// user opts in and preserved afterwards.
pub async fn handle_update_settings(
    store: &dyn SettingsStore,
    request: UpdateSettingsRequest,
) -> Result<SettingsResponse, String> {
    let existing = store
        .get_settings(request.user_id)
        .await
        .map_err(|e: WeftError| e.to_string())?;

    let now = Utc::now();
    let opted_in_at = match &existing {
        Some(row) if row.opted_in_at.is_some() => row.opted_in_at,
        _ if request.opted_in => Some(now),
        _ => None,
    };

    let settings = UserFederationSettings {
        user_id: request.user_id,
        opted_in: request.opted_in,
        privacy_level: request.privacy_level,
        service_reach: request.service_reach,
        show_location: request.show_location,
        show_skills: request.show_skills,
        allow_messaging: request.allow_messaging,
        allow_transactions: request.allow_transactions,
        opted_in_at,
        updated_at: now,
    };
    store
        .save_settings(&settings)
        .await
        .map_err(|e| e.to_string())?;
    Ok(SettingsResponse { settings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_store::MemorySettingsStore;

    fn update(user_id: UserId, opted_in: bool) -> UpdateSettingsRequest {
        UpdateSettingsRequest {
            user_id,
            opted_in,
            privacy_level: PrivacyLevel::Social,
            service_reach: ServiceReach::WillTravel,
            show_location: true,
            show_skills: true,
            allow_messaging: true,
            allow_transactions: false,
        }
    }

    #[tokio::test]
    async fn missing_row_reads_as_private_defaults() {
        let store = MemorySettingsStore::new();
        let resp = handle_get_settings(&store, GetSettingsRequest { user_id: 7 })
            .await
            .unwrap();
        assert!(!resp.settings.opted_in);
        assert_eq!(resp.settings.privacy_level, PrivacyLevel::Discovery);
    }

    #[tokio::test]
    async fn opted_in_at_is_stamped_once() {
        let store = MemorySettingsStore::new();

        let first = handle_update_settings(&store, update(7, true)).await.unwrap();
        let stamped = first.settings.opted_in_at.expect("opt-in not stamped");

        // Opting out and back in keeps the original timestamp.
        handle_update_settings(&store, update(7, false)).await.unwrap();
        let again = handle_update_settings(&store, update(7, true)).await.unwrap();
        assert_eq!(again.settings.opted_in_at, Some(stamped));
    }

    #[tokio::test]
    async fn never_opted_in_has_no_stamp() {
        let store = MemorySettingsStore::new();
        let resp = handle_update_settings(&store, update(7, false)).await.unwrap();
        assert!(resp.settings.opted_in_at.is_none());
    }
}
