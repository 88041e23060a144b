// crates/weft-activity/src/timeline.rs

use chrono::{DateTime, Utc};

/// Format an entry timestamp relative to `now`:
/// under a minute "Just now", then minutes, hours, and days, and past a
/// week an absolute short date. Future timestamps clamp to "Just now".
pub fn format_relative(occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - occurred_at).num_seconds();
    if diff < 60 {
        "Just now".to_string()
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else if diff < 604800 {
        format!("{}d ago", diff / 86400)
    } else {
        occurred_at.format("%b %d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(seconds_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        (now - Duration::seconds(seconds_ago), now)
    }

    #[test]
    fn boundaries_are_exact() {
        let (t, now) = at(59);
        assert_eq!(format_relative(t, now), "Just now");
        let (t, now) = at(60);
        assert_eq!(format_relative(t, now), "1m ago");
        let (t, now) = at(3599);
        assert_eq!(format_relative(t, now), "59m ago");
        let (t, now) = at(3600);
        assert_eq!(format_relative(t, now), "1h ago");
        let (t, now) = at(86399);
        assert_eq!(format_relative(t, now), "23h ago");
        let (t, now) = at(86400);
        assert_eq!(format_relative(t, now), "1d ago");
        let (t, now) = at(604799);
        assert_eq!(format_relative(t, now), "6d ago");
    }

    #[test]
    fn week_old_entries_show_an_absolute_date() {
        let (t, now) = at(604800);
        assert_eq!(format_relative(t, now), "Jun 08, 2024");
    }

    #[test]
    fn future_timestamps_clamp_to_just_now() {
        let (t, now) = at(-30);
        assert_eq!(format_relative(t, now), "Just now");
    }
}
