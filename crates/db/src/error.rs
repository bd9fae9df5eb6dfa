/// Failure of a gateway call.
///
/// A query that returns zero rows is not an error; it is an empty `Vec`.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The database could not be reached or no connection was available.
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// The statement was rejected or failed while running.
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// The call did not finish within the configured bound.
    #[error("Query timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// A returned row did not match the expected record shape.
    #[error("Row decoding failed: {0}")]
    Decode(String),
}

impl QueryError {
    /// Stable machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Execution(_) => "execution",
            Self::Timeout { .. } => "timeout",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => Self::Decode(err.to_string()),
            other => Self::Execution(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Execution(err.to_string())
        }
    }
}
