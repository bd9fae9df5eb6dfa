#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use tenantwatch_api::config::Settings;
use tenantwatch_api::router::build_app_router;
use tenantwatch_api::state::AppState;
use tenantwatch_core::query::{meets_error_threshold, ParamValue, Statement};
use tenantwatch_core::scope::TenantScope;
use tenantwatch_core::write_history::{StoredTimestamp, WriteHistoryRecord};
use tenantwatch_db::{ActivityGateway, QueryError};

// ---------------------------------------------------------------------------
// In-memory gateway
// ---------------------------------------------------------------------------

/// One stored write-history row plus the tenant's soft-delete flag.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub record: WriteHistoryRecord,
    pub tenant_deleted: bool,
}

/// Evaluates built statements against an in-memory table.
///
/// Filters are read from the bound parameters (`tenant_id`,
/// `error_threshold`, `limit`, `offset`), mirroring the SQL predicates.
#[derive(Default)]
pub struct FakeGateway {
    rows: Vec<StoredRow>,
    fail_with: Mutex<Option<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    scopes: Mutex<Vec<TenantScope>>,
}

impl FakeGateway {
    pub fn new(rows: Vec<StoredRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every following call fail with an execution error.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn scopes(&self) -> Vec<TenantScope> {
        self.scopes.lock().unwrap().clone()
    }

    fn evaluate(&self, statement: &Statement) -> Vec<WriteHistoryRecord> {
        let param = |name: &str| {
            statement
                .params
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.value.clone())
        };

        let mut matching: Vec<&StoredRow> = self
            .rows
            .iter()
            .filter(|row| match param("tenant_id") {
                Some(ParamValue::Text(tenant)) => row.record.tenant_id == tenant,
                _ => true,
            })
            .filter(|row| match param("error_threshold") {
                Some(ParamValue::Float(threshold)) => meets_error_threshold(
                    row.record.error_count,
                    row.record.records_count,
                    threshold,
                ),
                _ => true,
            })
            .filter(|row| {
                !statement.sql.contains("deleted_date IS NULL") || !row.tenant_deleted
            })
            .collect();

        matching.sort_by(|a, b| {
            b.record
                .finished_at
                .to_utc()
                .cmp(&a.record.finished_at.to_utc())
                .then(b.record.id.cmp(&a.record.id))
        });

        let int = |name: &str| match param(name) {
            Some(ParamValue::Int(v)) => v as usize,
            _ => 0,
        };

        matching
            .into_iter()
            .skip(int("offset"))
            .take(int("limit"))
            .map(|row| row.record.clone())
            .collect()
    }
}

impl ActivityGateway for FakeGateway {
    async fn fetch_write_history(
        &self,
        statement: &Statement,
        scope: &TenantScope,
    ) -> Result<Vec<WriteHistoryRecord>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.scopes.lock().unwrap().push(scope.clone());

        let failure = self.fail_with.lock().unwrap().clone();
        match failure {
            Some(message) => Err(QueryError::Execution(message)),
            None => Ok(self.evaluate(statement)),
        }
    }
}

/// A write-history record finishing `minute` minutes after 2024-03-01 00:00 UTC.
pub fn record(
    id: i64,
    tenant: &str,
    records_count: i64,
    error_count: i64,
    minute: i64,
) -> WriteHistoryRecord {
    let finished = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        + chrono::Duration::minutes(minute);
    WriteHistoryRecord {
        id,
        tenant_id: tenant.to_string(),
        records_count,
        error_count,
        duration_ms: 1_000 + id,
        db_persist_duration_ms: 200,
        run_id: format!("run-{id}"),
        first_event_received_at_ms: finished.timestamp_millis() - 60_000,
        last_event_received_at_ms: finished.timestamp_millis() - 1_000,
        finished_at: StoredTimestamp::Naive(finished.naive_utc()),
        base_domain: Some(format!("{tenant}.example.com")),
        name: Some(tenant.to_uppercase()),
        contact_email: None,
    }
}

pub fn active(record: WriteHistoryRecord) -> StoredRow {
    StoredRow {
        record,
        tenant_deleted: false,
    }
}

pub fn deleted(record: WriteHistoryRecord) -> StoredRow {
    StoredRow {
        record,
        tenant_deleted: true,
    }
}

/// 45 runs over three tenants with varied error rates; `ghost` is deleted.
pub fn sample_rows() -> Vec<StoredRow> {
    let tenants = ["acme", "globex", "initech"];
    let mut rows: Vec<StoredRow> = (0..45)
        .map(|i| {
            let tenant = tenants[i as usize % tenants.len()];
            let records_count = if i % 7 == 0 { 0 } else { 100 };
            let error_count = (i * 13) % 60;
            active(record(i + 1, tenant, records_count, error_count, i))
        })
        .collect();
    rows.push(deleted(record(100, "ghost", 10, 10, 500)));
    rows
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Settings pointing at stores that do not exist.
pub fn unreachable_settings() -> Settings {
    let vars = HashMap::from([
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("POSTGRES_HOST", "127.0.0.1"),
        ("DATABASE_PORT", "1"),
        ("POSTGRES_USER", "reader"),
        ("POSTGRES_PASSWORD", "unused"),
        ("POSTGRES_DB", "platform"),
        ("CH_DB_HOST", "127.0.0.1"),
        ("CH_DB_PORT", "1"),
        ("CH_DB_USER", "default"),
        ("CH_DB_PASSWORD", "unused"),
        ("QUERY_TIMEOUT_SECS", "2"),
    ]);
    Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test settings must parse")
}

/// Build the full application router over a lazy pool that never connects
/// successfully. Validation paths never touch it; query paths fail fast.
pub fn build_test_app() -> Router {
    let settings = unreachable_settings();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy_with(settings.postgres.connect_options());
    let state = AppState::new(pool, &settings);
    build_app_router(state, &settings.server)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
