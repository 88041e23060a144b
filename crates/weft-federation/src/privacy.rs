// crates/weft-federation/src/privacy.rs
//
// PrivacyGate: decides which fields of a member are exposable to a partner
// tenant, and whether cross-tenant messaging/transactions are permitted.
//
// Deny by default. Exposure requires the user's master opt-in, then the
// privacy-level base set, intersected with the user's own visibility
// toggles, intersected with what the partnership enables. Toggles can only
// restrict what a level allows, never expand it.

use weft_core::{
    FeatureSet, FederatedMember, FieldSet, MemberField, PrivacyLevel, UserFederationSettings,
};

/// The fields a privacy level exposes before toggles and partnership flags
/// are applied. Each level is a strict superset of the previous one.
pub fn base_fields(level: PrivacyLevel) -> FieldSet {
    let mut fields = FieldSet::from([
        MemberField::Name,
        MemberField::Avatar,
        MemberField::Bio,
        MemberField::ServiceReach,
    ]);
    if level >= PrivacyLevel::Social {
        fields.insert(MemberField::Location);
        fields.insert(MemberField::Skills);
        fields.insert(MemberField::Messaging);
    }
    if level >= PrivacyLevel::Economic {
        fields.insert(MemberField::Transactions);
    }
    fields
}

/// The fields of this user that may cross to a partner whose partnership
/// direction enables `partner_features`.
///
/// Empty when the user has not opted in, or when the partnership does not
/// enable member discovery at all.
pub fn exposed_fields(
    settings: &UserFederationSettings,
    partner_features: &FeatureSet,
) -> FieldSet {
    if !settings.opted_in || !partner_features.members {
        return FieldSet::new();
    }

    let mut fields = base_fields(settings.privacy_level);
    if !settings.show_location {
        fields.remove(&MemberField::Location);
    }
    if !settings.show_skills {
        fields.remove(&MemberField::Skills);
    }
    if !settings.allow_messaging || !partner_features.messaging {
        fields.remove(&MemberField::Messaging);
    }
    if !settings.allow_transactions || !partner_features.transactions {
        fields.remove(&MemberField::Transactions);
    }
    fields
}

/// Whether the user accepts cross-tenant messages at all: opted in, at
/// least the Social level, and the messaging toggle enabled.
pub fn can_message(settings: &UserFederationSettings) -> bool {
    settings.opted_in
        && settings.privacy_level >= PrivacyLevel::Social
        && settings.allow_messaging
}

/// Whether the user accepts cross-tenant transactions: opted in, the
/// Economic level, and the transactions toggle enabled.
pub fn can_transact(settings: &UserFederationSettings) -> bool {
    settings.opted_in
        && settings.privacy_level >= PrivacyLevel::Economic
        && settings.allow_transactions
}

/// Apply the gate to a member projection bound for a viewer behind the
/// given partnership direction. Returns `None` when nothing is exposable —
/// the record is dropped from results entirely.
pub fn redact_member(
    profile: FederatedMember,
    settings: &UserFederationSettings,
    partner_features: &FeatureSet,
) -> Option<FederatedMember> {
    let fields = exposed_fields(settings, partner_features);
    if fields.is_empty() {
        return None;
    }

    Some(FederatedMember {
        id: profile.id,
        tenant_id: profile.tenant_id,
        name: profile.name,
        avatar_url: profile.avatar_url.filter(|_| fields.contains(&MemberField::Avatar)),
        bio: profile.bio.filter(|_| fields.contains(&MemberField::Bio)),
        location: profile
            .location
            .filter(|_| fields.contains(&MemberField::Location)),
        skills: if fields.contains(&MemberField::Skills) {
            profile.skills
        } else {
            Vec::new()
        },
        service_reach: profile
            .service_reach
            .filter(|_| fields.contains(&MemberField::ServiceReach)),
        messaging_enabled: fields.contains(&MemberField::Messaging),
        transactions_enabled: fields.contains(&MemberField::Transactions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::ServiceReach;

    fn open_settings(level: PrivacyLevel) -> UserFederationSettings {
        UserFederationSettings {
            opted_in: true,
            privacy_level: level,
            show_location: true,
            show_skills: true,
            allow_messaging: true,
            allow_transactions: true,
            ..UserFederationSettings::defaults_for(1)
        }
    }

    fn profile() -> FederatedMember {
        FederatedMember {
            id: 1,
            tenant_id: 1,
            name: "Alice".to_string(),
            avatar_url: Some("https://example.org/a.png".to_string()),
            bio: Some("Carpenter".to_string()),
            location: Some("Riverside".to_string()),
            skills: vec!["carpentry".to_string()],
            service_reach: Some(ServiceReach::WillTravel),
            messaging_enabled: true,
            transactions_enabled: true,
        }
    }

    #[test]
    fn exposed_fields_grow_monotonically_with_level() {
        let features = FeatureSet::all();
        let discovery = exposed_fields(&open_settings(PrivacyLevel::Discovery), &features);
        let social = exposed_fields(&open_settings(PrivacyLevel::Social), &features);
        let economic = exposed_fields(&open_settings(PrivacyLevel::Economic), &features);

        assert!(discovery.is_subset(&social));
        assert!(social.is_subset(&economic));
        assert!(discovery.len() < social.len());
        assert!(social.len() < economic.len());
    }

    #[test]
    fn monotonicity_holds_under_restrictive_toggles() {
        let features = FeatureSet::all();
        for (show_location, show_skills, allow_messaging, allow_transactions) in [
            (false, true, true, false),
            (true, false, false, true),
            (false, false, false, false),
        ] {
            let with_toggles = |level| {
                let mut s = open_settings(level);
                s.show_location = show_location;
                s.show_skills = show_skills;
                s.allow_messaging = allow_messaging;
                s.allow_transactions = allow_transactions;
                exposed_fields(&s, &features)
            };
            let discovery = with_toggles(PrivacyLevel::Discovery);
            let social = with_toggles(PrivacyLevel::Social);
            let economic = with_toggles(PrivacyLevel::Economic);
            assert!(discovery.is_subset(&social));
            assert!(social.is_subset(&economic));
        }
    }

    #[test]
    fn toggles_restrict_but_never_expand() {
        let features = FeatureSet::all();
        let mut settings = open_settings(PrivacyLevel::Discovery);
        settings.show_skills = true;
        // Discovery never exposes skills, toggle or not.
        assert!(!exposed_fields(&settings, &features).contains(&MemberField::Skills));

        let mut settings = open_settings(PrivacyLevel::Economic);
        settings.show_location = false;
        assert!(!exposed_fields(&settings, &features).contains(&MemberField::Location));
    }

    #[test]
    fn opt_out_exposes_nothing() {
        let mut settings = open_settings(PrivacyLevel::Economic);
        settings.opted_in = false;
        assert!(exposed_fields(&settings, &FeatureSet::all()).is_empty());
        assert!(redact_member(profile(), &settings, &FeatureSet::all()).is_none());
    }

    #[test]
    fn partnership_flags_gate_messaging_and_transactions() {
        let settings = open_settings(PrivacyLevel::Economic);
        let no_messaging = FeatureSet {
            messaging: false,
            ..FeatureSet::all()
        };
        let fields = exposed_fields(&settings, &no_messaging);
        assert!(!fields.contains(&MemberField::Messaging));
        assert!(fields.contains(&MemberField::Transactions));

        let members_only = FeatureSet {
            members: true,
            ..FeatureSet::none()
        };
        let fields = exposed_fields(&settings, &members_only);
        assert!(!fields.contains(&MemberField::Messaging));
        assert!(!fields.contains(&MemberField::Transactions));
        assert!(fields.contains(&MemberField::Name));
    }

    #[test]
    fn can_message_requires_social_level() {
        let mut settings = open_settings(PrivacyLevel::Discovery);
        assert!(!can_message(&settings));
        settings.privacy_level = PrivacyLevel::Social;
        assert!(can_message(&settings));
        assert!(!can_transact(&settings));
        settings.privacy_level = PrivacyLevel::Economic;
        assert!(can_transact(&settings));
        settings.allow_transactions = false;
        assert!(!can_transact(&settings));
    }

    #[test]
    fn redaction_clears_fields_outside_the_level() {
        let settings = open_settings(PrivacyLevel::Discovery);
        let redacted = redact_member(profile(), &settings, &FeatureSet::all()).unwrap();
        assert_eq!(redacted.name, "Alice");
        assert!(redacted.avatar_url.is_some());
        assert!(redacted.bio.is_some());
        assert!(redacted.location.is_none());
        assert!(redacted.skills.is_empty());
        assert!(!redacted.messaging_enabled);
        assert!(!redacted.transactions_enabled);
    }
}
