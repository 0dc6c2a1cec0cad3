use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::document::DocumentError;
use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Missing fields: {0}")]
    MissingFields(String),

    #[error("No text provided")]
    MissingText,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Could not decode file: {0}")]
    Decode(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Upstream API returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("Upstream API unreachable: {0}")]
    UpstreamTransport(String),

    #[error("Upstream API timed out")]
    Timeout,

    #[error("Invalid JSON from upstream model: {message}")]
    InvalidUpstreamJson { message: String, raw: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::Validation(format!("Failed to read multipart: {}", err.body_text()))
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedType(name) => AppError::UnsupportedType(name),
            ExtractionError::Decode(msg) => AppError::Decode(msg),
            ExtractionError::Failed(msg) => AppError::ExtractionFailed(msg),
            ExtractionError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, body } => AppError::Upstream { status, body },
            LlmError::Timeout => AppError::Timeout,
            LlmError::Http(e) => AppError::UpstreamTransport(e.to_string()),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::MissingText => AppError::MissingText,
            DocumentError::Pack(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Request body too large".to_string(),
            ),
            AppError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELDS",
                format!("Missing fields: {msg}"),
            ),
            AppError::MissingText => (
                StatusCode::BAD_REQUEST,
                "MISSING_TEXT",
                "No text provided".to_string(),
            ),
            AppError::UnsupportedType(name) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_TYPE",
                format!("Unsupported file type: {name}"),
            ),
            AppError::Decode(msg) => {
                tracing::warn!("Decode error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DECODE_ERROR",
                    format!("Could not decode file: {msg}"),
                )
            }
            AppError::ExtractionFailed(msg) => {
                tracing::error!("Extraction failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    format!("Extraction failed: {msg}"),
                )
            }
            AppError::Upstream { status, body } => {
                tracing::error!("Upstream API error {status}: {body}");
                let status =
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = Json(json!({
                    "error": {
                        "code": "UPSTREAM_ERROR",
                        "message": "The generative API rejected the request",
                        "upstream": upstream_payload(body),
                    }
                }));
                return (status, body).into_response();
            }
            AppError::UpstreamTransport(msg) => {
                tracing::error!("Upstream transport error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "The generative API could not be reached".to_string(),
                )
            }
            AppError::Timeout => {
                tracing::error!("Upstream API timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    "The generative API did not respond in time".to_string(),
                )
            }
            AppError::InvalidUpstreamJson { message, raw } => {
                tracing::error!("Invalid JSON from upstream model: {message}");
                let body = Json(json!({
                    "error": {
                        "code": "INVALID_UPSTREAM_JSON",
                        "message": format!("Invalid JSON from upstream model: {message}"),
                        "raw": raw,
                    }
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Upstream bodies are usually JSON; pass them through structured when they are.
fn upstream_payload(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
