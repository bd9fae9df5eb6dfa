pub mod activity;
pub mod health;
pub mod views;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /activity   -> stateless panels
/// /views      -> stateful dashboard views
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/activity", activity::router())
        .nest("/views", views::router())
}
