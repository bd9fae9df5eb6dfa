use axum::routing::get;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Activity panel routes mounted at `/activity`.
///
/// ```text
/// GET  /recent                         -> recent
/// GET  /tenant                         -> by_tenant
/// GET  /error-rate                     -> error_rate
/// GET  /error-rate/thresholds          -> threshold_options
/// GET  /tenants/{tenant_id}/history    -> tenant_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recent", get(activity::recent))
        .route("/tenant", get(activity::by_tenant))
        .route("/error-rate", get(activity::error_rate))
        .route("/error-rate/thresholds", get(activity::threshold_options))
        .route("/tenants/{tenant_id}/history", get(activity::tenant_history))
}
