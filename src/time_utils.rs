// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.
//!
//! Contact birth dates and ages are evaluated against the UTC calendar day.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Current calendar day in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_drops_subseconds() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(format_utc_rfc3339(date), "2024-03-09T14:05:00Z");
    }

    #[test]
    fn test_today_matches_now() {
        assert_eq!(today_utc(), Utc::now().date_naive());
    }
}
