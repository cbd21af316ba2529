//! Error handling
//!
//! One status per failure class: framework rejections keep their own status
//! (422 for schema violations), input-content problems are 400, oversized
//! uploads 413, everything else 500. Every body is `{"error": ..., "status": ...}`.

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Extractor rejections (malformed body, schema violations)
    Rejected { status: StatusCode, message: String },

    // Input-content violations
    BadRequest(String),
    PayloadTooLarge(String),

    // Inference / parsing failures
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected { status, .. } => *status,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Rejected { message, .. } => message,
            AppError::BadRequest(msg) => msg,
            AppError::PayloadTooLarge(msg) => msg,
            AppError::InternalError(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal failures are logged with their detail where they are built
        if !matches!(self, AppError::InternalError(_)) {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
