//! ClickHouse connection provider over the HTTP interface.
//!
//! The analytical store keeps one database per tenant. A "connection" is a
//! request context bound to that database; the underlying HTTP connections
//! are pooled by [`reqwest::Client`]. Statements use ClickHouse's
//! `{name:Type}` placeholders and their values are sent as `param_<name>`
//! URL parameters, so user input never reaches the SQL text.

use serde_json::{Map, Value};
use tenantwatch_core::query::{ParamValue, Statement};
use tenantwatch_core::scope::TenantId;

use crate::error::QueryError;
use crate::gateway::{ConnectionProvider, ScopedExecutor};
use crate::settings::ClickHouseSettings;

/// One decoded `JSONEachRow` row.
pub type ClickHouseRow = Map<String, Value>;

/// Longest error body kept in a [`QueryError`].
const MAX_ERROR_BODY_LEN: usize = 512;

/// Request context bound to one tenant database.
#[derive(Debug)]
pub struct ClickHouseSession {
    database: String,
}

impl ClickHouseSession {
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Issues statements against the ClickHouse HTTP interface.
pub struct ClickHouseProvider {
    client: reqwest::Client,
    settings: ClickHouseSettings,
}

impl ClickHouseProvider {
    pub fn new(settings: ClickHouseSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    /// Reuse an existing [`reqwest::Client`] (and its connection pool).
    pub fn with_client(client: reqwest::Client, settings: ClickHouseSettings) -> Self {
        Self { client, settings }
    }
}

impl ConnectionProvider for ClickHouseProvider {
    type Scope = TenantId;
    type Conn = ClickHouseSession;
    type Row = ClickHouseRow;

    async fn acquire(&self, database: &TenantId) -> Result<Self::Conn, QueryError> {
        Ok(ClickHouseSession {
            database: database.as_str().to_string(),
        })
    }

    async fn run(
        &self,
        conn: &mut Self::Conn,
        statement: &Statement,
    ) -> Result<Vec<ClickHouseRow>, QueryError> {
        let response = self
            .client
            .post(self.settings.base_url())
            .basic_auth(&self.settings.user, Some(&self.settings.password))
            .query(&request_params(&conn.database, statement))
            .body(statement.sql.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(QueryError::Execution(format!(
                "ClickHouse returned HTTP {}: {}",
                status.as_u16(),
                truncate(body.trim(), MAX_ERROR_BODY_LEN)
            )));
        }

        parse_json_each_row(&body)
    }

    async fn release(&self, conn: Self::Conn) {
        tracing::trace!(database = conn.database(), "Released ClickHouse session");
    }
}

/// URL parameters for one statement: target database, output format and
/// one `param_<name>` entry per bound parameter.
pub fn request_params(database: &str, statement: &Statement) -> Vec<(String, String)> {
    let mut params = vec![
        ("database".to_string(), database.to_string()),
        ("default_format".to_string(), "JSONEachRow".to_string()),
    ];
    params.extend(statement.params.iter().map(|p| {
        let value = match &p.value {
            ParamValue::Text(v) => v.clone(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Float(v) => v.to_string(),
        };
        (format!("param_{}", p.name), value)
    }));
    params
}

/// Decode a `JSONEachRow` body (one JSON object per line).
pub fn parse_json_each_row(body: &str) -> Result<Vec<ClickHouseRow>, QueryError> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(row)) => Ok(row),
            Ok(other) => Err(QueryError::Decode(format!(
                "Expected a JSON object per row, got {other}"
            ))),
            Err(e) => Err(QueryError::Decode(e.to_string())),
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Probe the analytical store with a trivial query in `database`.
pub async fn ping(
    executor: &ScopedExecutor<ClickHouseProvider>,
    database: &TenantId,
) -> Result<(), QueryError> {
    executor
        .execute(&Statement::new("SELECT 1 AS ok"), database)
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn params_are_sent_as_url_parameters() {
        let stmt = Statement::new(
            "SELECT count() AS rows FROM events WHERE run_id = {run_id:String} LIMIT {limit:Int64}",
        )
        .with_param("run_id", ParamValue::Text("r-1".into()))
        .with_param("limit", ParamValue::Int(20));

        let params = request_params("acme", &stmt);
        assert_eq!(params[0], ("database".into(), "acme".into()));
        assert_eq!(params[1], ("default_format".into(), "JSONEachRow".into()));
        assert_eq!(params[2], ("param_run_id".into(), "r-1".into()));
        assert_eq!(params[3], ("param_limit".into(), "20".into()));
        assert!(!stmt.sql.contains("r-1"));
    }

    #[test]
    fn parses_json_each_row_bodies() {
        let rows = parse_json_each_row("{\"ok\":1}\n{\"ok\":2}\n\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["ok"], 2);
        assert!(parse_json_each_row("").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_object_rows() {
        assert_matches!(parse_json_each_row("[1,2]"), Err(QueryError::Decode(_)));
        assert_matches!(parse_json_each_row("{oops"), Err(QueryError::Decode(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
