//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domain::{DomainError, FieldErrors};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error response body
///
/// Field-level validation failures use `{"errors": {...}}`; every other
/// failure is a single `{"error": "..."}` message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Fields { errors: FieldErrors },
    Message { error: String },
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    /// Create an error carrying a single message
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::Message {
                error: message.into(),
            },
        }
    }

    /// Field validation failure
    pub fn validation(errors: FieldErrors) -> Self {
        Self::with_fields(StatusCode::BAD_REQUEST, errors)
    }

    /// Field-keyed error map with an explicit status
    pub fn with_fields(status: StatusCode, errors: FieldErrors) -> Self {
        Self {
            status,
            body: ApiErrorBody::Fields { errors },
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Internal server error; the message is fixed so no detail leaks
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { errors } => Self::validation(errors),
            DomainError::DuplicateEmail { .. } => Self::bad_request(DUPLICATE_EMAIL_MESSAGE),
            DomainError::Storage { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self::internal()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            ApiErrorBody::Fields { errors } => write!(f, "{}: {}", self.status, errors),
            ApiErrorBody::Message { error } => write!(f, "{}: {}", self.status, error),
        }
    }
}

impl std::error::Error for ApiError {}
