//! Axum route handler for the Extraction API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// POST /extract/text
///
/// Multipart upload with the document in the `file` field. Other fields are
/// ignored.
#[tracing::instrument(skip(state, multipart))]
pub async fn handle_extract_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        tracing::info!(filename = %filename, bytes = bytes.len(), "Extracting uploaded file");
        let text = state.extractor.extract(bytes, &filename).await?;
        return Ok(Json(ExtractResponse { text }));
    }

    tracing::warn!("Extract request with no file");
    Err(AppError::Validation("No file uploaded".to_string()))
}
