// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
///
/// Millisecond precision keeps review creation times sortable as strings.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the Unix epoch for `date`.
pub fn unix_millis(date: DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_sorts_lexicographically() {
        let a = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(5);

        assert_eq!(format_utc_rfc3339(a), "2024-01-15T10:00:00.000Z");
        assert!(format_utc_rfc3339(a) < format_utc_rfc3339(b));
        assert_eq!(unix_millis(b) - unix_millis(a), 5);
    }
}
