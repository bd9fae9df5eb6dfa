use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tenantwatch_core::scope::TenantId;

use crate::state::AppState;

/// ClickHouse database probed by the health check.
const ANALYTICAL_HEALTH_DATABASE: &str = "default";

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// `APPLICATION_VERSION`, or the crate version.
    pub version: String,
    /// Whether the relational store is reachable.
    pub db_healthy: bool,
    /// Whether the analytical store is reachable.
    pub analytical_healthy: bool,
}

/// GET /health -- returns service and store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = tenantwatch_db::health_check(&state.pool).await.is_ok();

    let analytical_healthy = match TenantId::parse(ANALYTICAL_HEALTH_DATABASE) {
        Ok(database) => tenantwatch_db::clickhouse::ping(&state.analytical, &database)
            .await
            .is_ok(),
        Err(_) => false,
    };

    let status = if db_healthy && analytical_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: state.application_version.to_string(),
        db_healthy,
        analytical_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
