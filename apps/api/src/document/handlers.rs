//! Axum route handler for the Document API.

use axum::{
    extract::rejection::JsonRejection,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::document::{build_docx, DOCX_FILENAME, DOCX_MIME};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct TextToDocxRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /text/to/docx
///
/// Returns the text as a `.docx` attachment, one paragraph per blank-line
/// separated block. Absent, null, empty, or whitespace-only text is
/// rejected with 400.
pub async fn handle_text_to_docx(
    payload: Result<Json<TextToDocxRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let text = request.text.ok_or(AppError::MissingText)?;

    let bytes = tokio::task::spawn_blocking(move || build_docx(&text))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("docx task failed: {e}")))??;

    tracing::info!(bytes = bytes.len(), "Built DOCX");

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOCX_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
