//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codescope_core::Error;
use serde::Serialize;

/// Error returned by every handler, rendered as
/// `{"error": {"code", "message", "details"?}}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// 400 Bad Request.
pub fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
        details: None,
    }
}

/// 404 Not Found.
pub fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
        details: None,
    }
}

/// 500 for a failed call to the inference server.
pub fn upstream_error(details: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "upstream_error",
        message: "Failed to get response from the inference server".to_string(),
        details: Some(details.into()),
    }
}

/// 500 for anything else.
pub fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
        details: None,
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            e @ (Error::InvalidInput(_)
            | Error::InvalidPattern(_)
            | Error::Ignore(_)
            | Error::Archive(_)) => bad_request(e.to_string()),
            Error::NotFound(message) => not_found(message),
            Error::Upstream { message, status } => {
                tracing::warn!("Inference server error (status {:?}): {}", status, message);
                upstream_error(message)
            }
            other => {
                tracing::error!("Request failed: {}", other);
                internal(other.to_string())
            }
        }
    }
}
