use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::usecases::{
    ledger::LedgerError, notifications::NotificationError, orders::OrderError,
    pricing::PricingError, ratings::RatingError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Builds the JSON error body. Server errors never leak their detail to the client.
pub fn error_response(status: StatusCode, message: String) -> Response {
    let message = if status.is_server_error() {
        error!(status = status.as_u16(), error = %message, "http: internal error");
        "Internal server error".to_string()
    } else {
        message
    };

    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message,
    });

    (status, body).into_response()
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

impl IntoResponse for RatingError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_masked() {
        let response = OrderError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn business_errors_keep_their_status() {
        assert_eq!(
            OrderError::OrderAlreadyProcessed.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RatingError::AlreadyRated.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LedgerError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            NotificationError::NotificationNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
