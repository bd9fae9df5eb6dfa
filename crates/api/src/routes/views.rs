use axum::routing::{get, post};
use axum::Router;

use crate::handlers::views;
use crate::state::AppState;

/// View session routes mounted at `/views`.
///
/// ```text
/// POST    /                    -> open_view
/// GET     /{view_id}           -> get_view
/// DELETE  /{view_id}           -> close_view
/// POST    /{view_id}/events    -> dispatch_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(views::open_view))
        .route("/{view_id}", get(views::get_view).delete(views::close_view))
        .route("/{view_id}/events", post(views::dispatch_event))
}
