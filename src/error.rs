//! HTTP error type shared by all route handlers.
//!
//! Every error response has the same body:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Patient not found." } }
//! ```
//!
//! Codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::anonymizer::AnonymizeError;
use crate::docx::DocxError;
use crate::intake::IntakeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid document: {0}")]
    Docx(#[from] DocxError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Anonymize(#[from] AnonymizeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::Intake(IntakeError::PatientNotFound) => {
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(_)
            | ApiError::Docx(_)
            | ApiError::Intake(_)
            | ApiError::Anonymize(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::BAD_REQUEST => "bad_request",
            _ => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
