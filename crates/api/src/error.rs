//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use gift::GiftError;

/// API-level error type that maps to HTTP responses.
///
/// Request decoding problems are reported before any service runs.
/// Business-rule failures keep their own status: validation maps to 400,
/// missing references to 404, stock conflicts to 409 and everything
/// else to 500.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed header, path or body.
    BadRequest(String),
    /// Catalog error.
    Domain(DomainError),
    /// Gift sending error.
    Gift(GiftError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => (domain_error_status(&err), err.to_string()),
            ApiError::Gift(err) => (gift_error_status(&err), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::BlankName { .. }
        | DomainError::NameTooLong { .. }
        | DomainError::InvalidPrice { .. }
        | DomainError::InvalidEmail { .. }
        | DomainError::InvalidStock { .. }
        | DomainError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
        DomainError::CategoryNotFound(_)
        | DomainError::ProductNotFound(_)
        | DomainError::MemberNotFound(_)
        | DomainError::OptionNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn gift_error_status(err: &GiftError) -> StatusCode {
    match err {
        GiftError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
        GiftError::OptionNotFound(_) | GiftError::MemberNotFound(_) => StatusCode::NOT_FOUND,
        GiftError::InsufficientStock { .. } => StatusCode::CONFLICT,
        GiftError::Delivery(_) | GiftError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<GiftError> for ApiError {
    fn from(err: GiftError) -> Self {
        ApiError::Gift(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
