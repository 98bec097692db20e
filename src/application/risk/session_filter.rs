use chrono::{DateTime, NaiveTime, Timelike, Utc};

/// Parses a `"UTC+2"` / `"UTC-5"` / `"UTC"` config string into whole-hour offset.
/// Unparsable strings fall back to `UTC` rather than failing analysis.
fn offset_hours(broker_timezone: &str) -> i64 {
    let rest = broker_timezone.trim().strip_prefix("UTC").unwrap_or("");
    if rest.is_empty() {
        return 0;
    }
    rest.parse::<i64>().unwrap_or(0)
}

fn broker_time(now_utc: DateTime<Utc>, broker_timezone: &str) -> NaiveTime {
    let shifted = now_utc + chrono::Duration::hours(offset_hours(broker_timezone));
    shifted.time()
}

fn in_window(t: NaiveTime, start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> bool {
    let start = NaiveTime::from_hms_opt(start_h, start_m, 0).unwrap();
    let end = NaiveTime::from_hms_opt(end_h, end_m, 0).unwrap();
    t >= start && t < end
}

/// Blackout windows, evaluated in broker-local time: the London-NY overlap and
/// the opening 30 minutes of each of the London and NY sessions.
pub fn session_blackout(now_utc: DateTime<Utc>, broker_timezone: &str) -> Option<&'static str> {
    let t = broker_time(now_utc, broker_timezone);
    if in_window(t, 12, 0, 15, 0) {
        Some("london_ny_overlap")
    } else if in_window(t, 8, 0, 8, 30) {
        Some("london_open")
    } else if in_window(t, 13, 0, 13, 30) {
        Some("ny_open")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blocks_the_london_ny_overlap() {
        let t = Utc.with_ymd_and_hms(2026, 1, 5, 13, 30, 0).unwrap();
        assert_eq!(session_blackout(t, "UTC"), Some("london_ny_overlap"));
    }

    #[test]
    fn allows_mid_session_hours() {
        let t = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap();
        assert_eq!(session_blackout(t, "UTC"), None);
    }

    #[test]
    fn applies_the_broker_offset() {
        let t = Utc.with_ymd_and_hms(2026, 1, 5, 6, 15, 0).unwrap();
        assert_eq!(session_blackout(t, "UTC+2"), Some("london_open"));
    }
}
