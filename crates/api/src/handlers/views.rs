//! Handlers for stateful dashboard views.
//!
//! A client opens a view, then sends UI events (filter changes, paging, row
//! activation) to it. The server keeps the page positions, so a client only
//! says what happened, never which offset to load.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tenantwatch_core::view::{ViewEvent, ViewKind};
use uuid::Uuid;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::sessions::ViewSnapshot;
use crate::state::AppState;

/// Body of `POST /views`.
#[derive(Debug, Deserialize)]
pub struct OpenViewRequest {
    pub kind: ViewKind,
}

/// POST /views
pub async fn open_view(
    State(state): State<AppState>,
    Json(body): Json<OpenViewRequest>,
) -> (StatusCode, Json<DataResponse<ViewSnapshot>>) {
    let snapshot = state.views.open(body.kind, &state.activity).await;
    (StatusCode::CREATED, Json(DataResponse { data: snapshot }))
}

/// GET /views/{view_id}
pub async fn get_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<ViewSnapshot>>> {
    let snapshot = state.views.snapshot(view_id).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /views/{view_id}/events
pub async fn dispatch_event(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Json(event): Json<ViewEvent>,
) -> AppResult<Json<DataResponse<ViewSnapshot>>> {
    let snapshot = state
        .views
        .dispatch(view_id, &event, &state.activity)
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /views/{view_id}
pub async fn close_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.views.close(view_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
