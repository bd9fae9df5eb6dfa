//! Handlers for the stateless activity panels.
//!
//! Each request carries its own filter and page; nothing is remembered
//! between calls. Query failures come back as a 200 panel with `error` set.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tenantwatch_core::query::{
    ActivityFilter, DEFAULT_ERROR_THRESHOLD, ERROR_THRESHOLD_OPTIONS,
};

use crate::activity::PanelView;
use crate::error::AppResult;
use crate::query::{ErrorRateParams, PageParams, TenantSearchParams, ValidQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// Thresholds offered by the error-rate page.
#[derive(Debug, Serialize)]
pub struct ThresholdOptions {
    pub options: &'static [f64],
    pub default: f64,
}

/// GET /activity/recent
pub async fn recent(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<DataResponse<PanelView>>> {
    let view = state.activity.recent(params.page_state()).await;
    Ok(Json(DataResponse { data: view }))
}

/// GET /activity/tenant
pub async fn by_tenant(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<TenantSearchParams>,
) -> AppResult<Json<DataResponse<PanelView>>> {
    let page = PageParams { page: params.page }.page_state();
    let filter = ActivityFilter::ByTenant {
        tenant_id: params.tenant_id,
    };
    let view = state.activity.search(&filter, page).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /activity/error-rate
pub async fn error_rate(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ErrorRateParams>,
) -> AppResult<Json<DataResponse<PanelView>>> {
    let page = PageParams { page: params.page }.page_state();
    let filter = ActivityFilter::ByErrorThreshold {
        threshold: params.threshold(),
    };
    let view = state.activity.search(&filter, page).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /activity/error-rate/thresholds
pub async fn threshold_options() -> Json<DataResponse<ThresholdOptions>> {
    Json(DataResponse {
        data: ThresholdOptions {
            options: &ERROR_THRESHOLD_OPTIONS,
            default: DEFAULT_ERROR_THRESHOLD,
        },
    })
}

/// GET /activity/tenants/{tenant_id}/history
pub async fn tenant_history(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> AppResult<Json<DataResponse<PanelView>>> {
    let view = state
        .activity
        .tenant_history(&tenant_id, params.page_state())
        .await?;
    Ok(Json(DataResponse { data: view }))
}
