//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ValidationErrors};
use serde_json::json;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(errors) => {
            let body = json!({
                "error": "Validation failed",
                "fields": errors.fields(),
            });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        not_found @ DomainError::NotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, not_found.to_string())
        }
        DomainError::Order(order_err) => {
            error_response(StatusCode::BAD_REQUEST, order_err.to_string())
        }
        DomainError::Store(store_err @ StoreError::Integrity { .. }) => {
            error_response(StatusCode::CONFLICT, store_err.to_string())
        }
        DomainError::Store(store_err) => {
            tracing::error!(error = %store_err, "internal server error");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Domain(DomainError::Validation(errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
