// crates/weft-federation/src/filters.rs
//
// Shared search predicates. Tenant-local filtering is pushed down to each
// tenant (the serving side runs these against its own raw data); the
// router re-applies them after privacy gating, so a field the gate just
// redacted away can no longer satisfy a filter.

use weft_core::{
    FederatedEvent, FederatedGroup, FederatedListing, FederatedMember, SearchFilters, ServiceReach,
};

/// Case-insensitive substring match.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Rank for the minimum-reach comparison: a member matches a requested
/// reach if their own reach is at least as far.
fn reach_rank(reach: ServiceReach) -> u8 {
    match reach {
        ServiceReach::LocalOnly => 0,
        ServiceReach::WillTravel => 1,
        ServiceReach::RemoteOk => 2,
    }
}

pub fn matches_member(member: &FederatedMember, filters: &SearchFilters) -> bool {
    if let Some(query) = &filters.query {
        let in_name = contains_ci(&member.name, query);
        let in_bio = member.bio.as_deref().is_some_and(|b| contains_ci(b, query));
        let in_skills = member.skills.iter().any(|s| contains_ci(s, query));
        if !in_name && !in_bio && !in_skills {
            return false;
        }
    }

    // Any requested skill may match (OR semantics).
    if !filters.skills.is_empty() {
        let any = filters.skills.iter().any(|wanted| {
            member
                .skills
                .iter()
                .any(|have| have.eq_ignore_ascii_case(wanted))
        });
        if !any {
            return false;
        }
    }

    if let Some(location) = &filters.location {
        match &member.location {
            Some(have) if contains_ci(have, location) => {}
            _ => return false,
        }
    }

    if let Some(wanted) = filters.service_reach {
        match member.service_reach {
            Some(have) if reach_rank(have) >= reach_rank(wanted) => {}
            _ => return false,
        }
    }

    if filters.require_messaging && !member.messaging_enabled {
        return false;
    }
    if filters.require_transactions && !member.transactions_enabled {
        return false;
    }

    true
}

pub fn matches_listing(listing: &FederatedListing, filters: &SearchFilters) -> bool {
    if let Some(query) = &filters.query {
        if !contains_ci(&listing.title, query)
            && !contains_ci(&listing.description, query)
            && !contains_ci(&listing.category, query)
        {
            return false;
        }
    }
    if let Some(category) = &filters.category {
        if !listing.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(kind) = filters.listing_kind {
        if listing.kind != kind {
            return false;
        }
    }
    true
}

pub fn matches_event(event: &FederatedEvent, filters: &SearchFilters) -> bool {
    if let Some(query) = &filters.query {
        let in_location = event
            .location
            .as_deref()
            .is_some_and(|l| contains_ci(l, query));
        if !contains_ci(&event.title, query)
            && !contains_ci(&event.description, query)
            && !in_location
        {
            return false;
        }
    }
    if let Some(location) = &filters.location {
        match &event.location {
            Some(have) if contains_ci(have, location) => {}
            _ => return false,
        }
    }
    if let Some(after) = filters.starts_after {
        if event.starts_at < after {
            return false;
        }
    }
    if let Some(before) = filters.starts_before {
        if event.starts_at > before {
            return false;
        }
    }
    true
}

pub fn matches_group(group: &FederatedGroup, filters: &SearchFilters) -> bool {
    if let Some(query) = &filters.query {
        if !contains_ci(&group.name, query) && !contains_ci(&group.description, query) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn member(skills: &[&str], reach: ServiceReach) -> FederatedMember {
        FederatedMember {
            id: 1,
            tenant_id: 1,
            name: "Alice".to_string(),
            avatar_url: None,
            bio: Some("Woodworker and tutor".to_string()),
            location: Some("Riverside".to_string()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            service_reach: Some(reach),
            messaging_enabled: true,
            transactions_enabled: false,
        }
    }

    #[test]
    fn skills_filter_uses_or_semantics() {
        let alice = member(&["carpentry"], ServiceReach::LocalOnly);
        let filters = SearchFilters {
            skills: vec!["Carpentry".to_string(), "tutoring".to_string()],
            ..SearchFilters::default()
        };
        assert!(matches_member(&alice, &filters));

        let filters = SearchFilters {
            skills: vec!["plumbing".to_string()],
            ..SearchFilters::default()
        };
        assert!(!matches_member(&alice, &filters));
    }

    #[test]
    fn redacted_skills_no_longer_match() {
        let mut alice = member(&["carpentry"], ServiceReach::LocalOnly);
        alice.skills.clear();
        let filters = SearchFilters {
            skills: vec!["carpentry".to_string()],
            ..SearchFilters::default()
        };
        assert!(!matches_member(&alice, &filters));
    }

    #[test]
    fn reach_is_a_minimum() {
        let local = member(&[], ServiceReach::LocalOnly);
        let travels = member(&[], ServiceReach::WillTravel);
        let remote = member(&[], ServiceReach::RemoteOk);
        let filters = SearchFilters {
            service_reach: Some(ServiceReach::WillTravel),
            ..SearchFilters::default()
        };
        assert!(!matches_member(&local, &filters));
        assert!(matches_member(&travels, &filters));
        assert!(matches_member(&remote, &filters));
    }

    #[test]
    fn free_text_matches_bio_case_insensitively() {
        let alice = member(&[], ServiceReach::LocalOnly);
        let filters = SearchFilters {
            query: Some("TUTOR".to_string()),
            ..SearchFilters::default()
        };
        assert!(matches_member(&alice, &filters));
    }

    #[test]
    fn event_window_bounds_are_inclusive() {
        let now = Utc::now();
        let event = FederatedEvent {
            id: 1,
            tenant_id: 1,
            title: "Repair café".to_string(),
            description: String::new(),
            location: None,
            starts_at: now,
            ends_at: None,
            attendee_count: 0,
        };
        let filters = SearchFilters {
            starts_after: Some(now),
            starts_before: Some(now),
            ..SearchFilters::default()
        };
        assert!(matches_event(&event, &filters));

        let filters = SearchFilters {
            starts_after: Some(now + Duration::seconds(1)),
            ..SearchFilters::default()
        };
        assert!(!matches_event(&event, &filters));
    }
}
