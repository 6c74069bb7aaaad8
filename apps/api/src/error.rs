//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"code": "...", "message": "..."}` with
//! a status derived from the [`ErrorCategory`] of the [`CoreError`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mostrador_core::{CoreError, ErrorCategory};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role may not perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// Body, path or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.category() {
                ErrorCategory::BadInput => StatusCode::BAD_REQUEST,
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Conflict => StatusCode::CONFLICT,
                ErrorCategory::ServerFault => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code for the client.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Core(err) => match err {
                CoreError::Validation(_) => "VALIDATION_ERROR",
                CoreError::NotFound { .. } => "NOT_FOUND",
                CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                CoreError::AlreadyCancelled { .. } => "ALREADY_CANCELLED",
                CoreError::Conflict { .. } => "CONFLICT",
                CoreError::Storage(_) => "STORAGE_ERROR",
            },
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Storage details stay in the log
            tracing::error!(error = %self, "Request failed with a storage fault");
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "code": self.code(), "message": message }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
