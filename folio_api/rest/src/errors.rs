use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResponse;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
}

/// Respond with `{ "success": false, "message": .., "code": .. }`.
pub fn error(status: StatusCode, message: &'static str, code: Option<&'static str>) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            message,
            code,
            errors: None,
        }),
    )
        .into_response()
}
