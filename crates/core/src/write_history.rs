//! Write-history domain records.
//!
//! One [`WriteHistoryRecord`] is a single sync run between the relational
//! store and the analytical store, joined with the owning tenant. A
//! [`DisplayRecord`] is the same run with its timestamps rendered for the
//! dashboard.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A timestamp as stored by the relational database.
///
/// The `finished_at` column carries no guaranteed timezone tag, so both
/// `timestamp` and `timestamptz` values are accepted. Naive values are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredTimestamp {
    Naive(NaiveDateTime),
    Utc(Timestamp),
}

impl StoredTimestamp {
    /// Resolve to a UTC instant, treating naive values as UTC.
    pub fn to_utc(self) -> Timestamp {
        match self {
            Self::Naive(naive) => naive.and_utc(),
            Self::Utc(ts) => ts,
        }
    }
}

/// One row of pipeline execution history joined with its tenant.
///
/// Tenant fields are optional because the join is a LEFT JOIN.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteHistoryRecord {
    pub id: DbId,
    pub tenant_id: String,
    pub records_count: i64,
    pub error_count: i64,
    pub duration_ms: i64,
    pub db_persist_duration_ms: i64,
    pub run_id: String,
    pub first_event_received_at_ms: i64,
    pub last_event_received_at_ms: i64,
    pub finished_at: StoredTimestamp,
    pub base_domain: Option<String>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

/// A write-history row ready for rendering.
///
/// Serializes as a flat object; the three formatted timestamps are in
/// `Asia/Kolkata` local time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub id: DbId,
    pub tenant_id: String,
    pub base_domain: Option<String>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub records_count: i64,
    pub error_count: i64,
    pub duration_ms: i64,
    pub db_persist_duration_ms: i64,
    pub run_id: String,
    pub first_event_received_at_ms: i64,
    pub last_event_received_at_ms: i64,
    pub finished_at: String,
    pub last_event_timestamp: String,
    pub first_event_timestamp: String,
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(StoredTimestamp::Naive(naive).to_utc(), expected);
        assert_eq!(StoredTimestamp::Utc(expected).to_utc(), expected);
    }
}
