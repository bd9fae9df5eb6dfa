use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tenantwatch_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for request-shape problems (bad threshold, invalid
/// tenant id, unknown view) and adds HTTP-specific variants. Query failures
/// never reach this type: the activity pipeline turns them into a panel
/// message instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tenantwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request (unparseable query string) with a
    /// human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
