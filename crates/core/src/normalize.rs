//! Result normalization: records to display rows plus a summary.

use serde::Serialize;

use crate::display_time::{epoch_ms_to_utc, format_display, format_stored};
use crate::error::CoreError;
use crate::write_history::{DisplayRecord, WriteHistoryRecord};

/// Summary text shown when a query returns no rows.
pub const NO_DATA_MESSAGE: &str = "No data found for the specified criteria.";

/// Aggregate figures for one rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub row_count: usize,
    pub error_count_total: i64,
}

impl ActivitySummary {
    /// One-line summary for the panel footer.
    ///
    /// An empty page yields [`NO_DATA_MESSAGE`] rather than zero counts.
    pub fn text(&self) -> String {
        if self.row_count == 0 {
            NO_DATA_MESSAGE.to_string()
        } else {
            format!(
                "Row Count: {}, Error Count: {}",
                self.row_count, self.error_count_total
            )
        }
    }
}

/// Display records for one page and their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPage {
    pub records: Vec<DisplayRecord>,
    pub summary: ActivitySummary,
}

impl NormalizedPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Convert raw records into display records and compute the page summary.
///
/// Fails with [`CoreError::Validation`] if an epoch-millisecond field is
/// outside the representable date range.
pub fn normalize(records: Vec<WriteHistoryRecord>) -> Result<NormalizedPage, CoreError> {
    let records = records
        .into_iter()
        .map(to_display)
        .collect::<Result<Vec<_>, _>>()?;

    let summary = ActivitySummary {
        row_count: records.len(),
        error_count_total: records.iter().map(|r| r.error_count).sum(),
    };

    Ok(NormalizedPage { records, summary })
}

fn to_display(record: WriteHistoryRecord) -> Result<DisplayRecord, CoreError> {
    let last_event_timestamp = display_epoch_ms(record.id, record.last_event_received_at_ms)?;
    let first_event_timestamp = display_epoch_ms(record.id, record.first_event_received_at_ms)?;

    Ok(DisplayRecord {
        id: record.id,
        tenant_id: record.tenant_id,
        base_domain: record.base_domain,
        name: record.name,
        contact_email: record.contact_email,
        records_count: record.records_count,
        error_count: record.error_count,
        duration_ms: record.duration_ms,
        db_persist_duration_ms: record.db_persist_duration_ms,
        run_id: record.run_id,
        first_event_received_at_ms: record.first_event_received_at_ms,
        last_event_received_at_ms: record.last_event_received_at_ms,
        finished_at: format_stored(record.finished_at),
        last_event_timestamp,
        first_event_timestamp,
    })
}

fn display_epoch_ms(id: i64, epoch_ms: i64) -> Result<String, CoreError> {
    epoch_ms_to_utc(epoch_ms).map(format_display).ok_or_else(|| {
        CoreError::Validation(format!(
            "Write history {id} has out-of-range event timestamp {epoch_ms}"
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
