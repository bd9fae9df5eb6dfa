//! Conversion of stored timestamps to dashboard display time.
//!
//! The dashboard shows every timestamp in India Standard Time. IST is a
//! fixed UTC+05:30 offset with no daylight saving, so a [`FixedOffset`] is
//! an exact representation of `Asia/Kolkata`.

use chrono::{DateTime, FixedOffset, Utc};

use crate::types::Timestamp;
use crate::write_history::StoredTimestamp;

/// Offset of `Asia/Kolkata` from UTC, in seconds.
pub const KOLKATA_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Zero-padded 24-hour format, no offset suffix.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The `Asia/Kolkata` offset.
pub fn kolkata() -> FixedOffset {
    FixedOffset::east_opt(KOLKATA_OFFSET_SECS).expect("IST offset is within +/-24h")
}

/// Format a UTC instant in display time.
pub fn format_display(ts: Timestamp) -> String {
    ts.with_timezone(&kolkata()).format(DISPLAY_FORMAT).to_string()
}

/// Format a stored (possibly naive) timestamp in display time.
pub fn format_stored(ts: StoredTimestamp) -> String {
    format_display(ts.to_utc())
}

/// Convert epoch milliseconds to a UTC instant at whole-second precision.
///
/// Sub-second precision is dropped with truncating division, matching the
/// `epoch / 1000` integer conversion the history timestamps have always used.
/// Returns `None` when the value is outside chrono's representable range.
pub fn epoch_ms_to_utc(epoch_ms: i64) -> Option<Timestamp> {
    DateTime::<Utc>::from_timestamp(epoch_ms / 1000, 0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[test]
    fn epoch_zero_displays_half_past_five() {
        let ts = epoch_ms_to_utc(0).unwrap();
        assert_eq!(ts.format(DISPLAY_FORMAT).to_string(), "1970-01-01 00:00:00");
        assert_eq!(format_display(ts), "1970-01-01 05:30:00");
    }

    #[test]
    fn known_epoch_is_reproducible() {
        let ts = epoch_ms_to_utc(1_700_000_000_000).unwrap();
        assert_eq!(format_display(ts), "2023-11-15 03:43:20");
        assert_eq!(format_display(ts), format_display(ts));
    }

    #[test]
    fn milliseconds_are_truncated() {
        let ts = epoch_ms_to_utc(1_700_000_000_999).unwrap();
        assert_eq!(format_display(ts), "2023-11-15 03:43:20");
    }

    #[test]
    fn negative_epoch_truncates_toward_zero() {
        // -1500 ms / 1000 == -1 s, as with SQL integer division.
        let ts = epoch_ms_to_utc(-1_500).unwrap();
        assert_eq!(format_display(ts), "1970-01-01 05:29:59");
    }

    #[test]
    fn out_of_range_epoch_is_none() {
        assert!(epoch_ms_to_utc(i64::MAX).is_none());
    }

    #[test]
    fn day_rollover_across_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(format_display(ts), "2025-01-01 01:30:00");
    }

    #[test]
    fn naive_and_aware_values_format_identically() {
        let naive = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let aware = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(format_stored(StoredTimestamp::Naive(naive)), "2024-06-01 05:30:00");
        assert_eq!(
            format_stored(StoredTimestamp::Naive(naive)),
            format_stored(StoredTimestamp::Utc(aware))
        );
    }
}
