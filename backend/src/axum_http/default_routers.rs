use axum::{http::StatusCode, response::IntoResponse};
use tracing::debug;

use crate::axum_http::error_responses::error_response;

pub async fn not_found() -> impl IntoResponse {
    debug!("backend router: not_found handler invoked");
    error_response(StatusCode::NOT_FOUND, "Not found".to_string())
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
