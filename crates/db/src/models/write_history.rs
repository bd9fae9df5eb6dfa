//! Write-history row model (`core_master.clickhouse_write_history` joined
//! with `core_master.tenant`).

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::{Decode, FromRow, Postgres, Type, ValueRef};
use tenantwatch_core::query::SELECT_COLUMNS;
use tenantwatch_core::types::DbId;
use tenantwatch_core::write_history::{StoredTimestamp, WriteHistoryRecord};

/// A row as returned by the write-history SELECT list.
///
/// Decoded by column alias, so column order in the SELECT is irrelevant.
#[derive(Debug, Clone, FromRow)]
pub struct WriteHistoryRow {
    pub id: DbId,
    pub tenant_id: String,
    pub records_count: i64,
    pub error_count: i64,
    pub duration_ms: i64,
    pub db_persist_duration_ms: i64,
    pub run_id: String,
    pub first_event_received_at_ms: i64,
    pub last_event_received_at_ms: i64,
    pub finished_at: PgTimestamp,
    pub base_domain: Option<String>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

impl WriteHistoryRow {
    /// Field names, in declaration order.
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "records_count",
        "error_count",
        "duration_ms",
        "db_persist_duration_ms",
        "run_id",
        "first_event_received_at_ms",
        "last_event_received_at_ms",
        "finished_at",
        "base_domain",
        "name",
        "contact_email",
    ];
}

const _: () = assert!(
    WriteHistoryRow::FIELDS.len() == SELECT_COLUMNS.len(),
    "write-history SELECT list and row model have different column counts"
);

impl From<WriteHistoryRow> for WriteHistoryRecord {
    fn from(row: WriteHistoryRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            records_count: row.records_count,
            error_count: row.error_count,
            duration_ms: row.duration_ms,
            db_persist_duration_ms: row.db_persist_duration_ms,
            run_id: row.run_id,
            first_event_received_at_ms: row.first_event_received_at_ms,
            last_event_received_at_ms: row.last_event_received_at_ms,
            finished_at: row.finished_at.0,
            base_domain: row.base_domain,
            name: row.name,
            contact_email: row.contact_email,
        }
    }
}

// ---------------------------------------------------------------------------
// PgTimestamp
// ---------------------------------------------------------------------------

/// Decodes either `timestamp` or `timestamptz` into a [`StoredTimestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgTimestamp(pub StoredTimestamp);

impl Type<Postgres> for PgTimestamp {
    fn type_info() -> PgTypeInfo {
        <DateTime<Utc> as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <DateTime<Utc> as Type<Postgres>>::compatible(ty)
            || <NaiveDateTime as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for PgTimestamp {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let is_aware = <DateTime<Utc> as Type<Postgres>>::compatible(&value.type_info());
        let stored = if is_aware {
            StoredTimestamp::Utc(<DateTime<Utc> as Decode<'r, Postgres>>::decode(value)?)
        } else {
            StoredTimestamp::Naive(<NaiveDateTime as Decode<'r, Postgres>>::decode(value)?)
        };
        Ok(Self(stored))
    }
}
