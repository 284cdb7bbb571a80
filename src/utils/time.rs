//! The fixed reporting timezone and human-readable timestamp formats.
//!
//! All timestamps shown in notifications, and the daily SSL-summary schedule,
//! use IST (+05:30) regardless of the host timezone.

use chrono::{DateTime, FixedOffset, Utc};

/// Returns the fixed reporting timezone (IST, UTC+05:30).
pub fn reporting_zone() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is in range")
}

/// Formats a timestamp in the reporting zone, e.g. `"02 Aug 2026 03:04 PM"`.
pub fn format_report_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&reporting_zone())
        .format("%d %b %Y %I:%M %p")
        .to_string()
}

/// Formats a date in the reporting zone, e.g. `"02 Aug 2026"`.
pub fn format_report_date(t: DateTime<Utc>) -> String {
    t.with_timezone(&reporting_zone()).format("%d %b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reporting_zone_is_ist() {
        assert_eq!(reporting_zone().local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn report_time_shifts_into_ist() {
        // 04:00 UTC is 09:30 IST.
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 4, 0, 0).unwrap();
        assert_eq!(format_report_time(t), "01 Mar 2026 09:30 AM");
    }
}
