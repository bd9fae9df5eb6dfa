/// All database primary keys are PostgreSQL BIGINT.
pub type DbId = i64;

/// Timestamps that are known to be UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
