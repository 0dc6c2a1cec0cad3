//! Text extraction from uploaded files, dispatched on the filename suffix.
//!
//! PDFs are read through their text layer first; when that yields nothing the
//! pages are rasterized and OCR'd instead.

pub mod docx;
pub mod handlers;
pub mod ocr;
pub mod pdf;

use std::any::Any;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use ocr::{OcrAdapter, OcrError};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<OcrError> for ExtractionError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Io(e) => ExtractionError::Internal(anyhow::Error::new(e).context("OCR I/O")),
            other => ExtractionError::Failed(other.to_string()),
        }
    }
}

/// The handling branch for an upload, chosen by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
    Image,
}

impl FileKind {
    /// Case-insensitive suffix match; `None` for anything unsupported.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let name = filename.to_lowercase();
        if name.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if name.ends_with(".docx") {
            Some(Self::Docx)
        } else if name.ends_with(".txt") {
            Some(Self::Txt)
        } else if [".png", ".jpg", ".jpeg"].iter().any(|ext| name.ends_with(ext)) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Turns uploaded bytes into trimmed plain text.
#[derive(Clone)]
pub struct Extractor {
    ocr: OcrAdapter,
}

impl Extractor {
    pub fn new(ocr: OcrAdapter) -> Self {
        Self { ocr }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OcrAdapter::from_config(config))
    }

    pub async fn extract(&self, bytes: Bytes, filename: &str) -> Result<String, ExtractionError> {
        let kind = FileKind::from_filename(filename)
            .ok_or_else(|| ExtractionError::UnsupportedType(filename.to_string()))?;
        debug!(?kind, size = bytes.len(), "Extracting text from {filename}");

        let text = match kind {
            FileKind::Pdf => self.extract_pdf(bytes).await?,
            FileKind::Docx => run_blocking(move || docx::extract_docx_text(&bytes)).await?,
            FileKind::Txt => decode_utf8(&bytes)?,
            FileKind::Image => self.ocr.ocr_image(&bytes).await?,
        };

        Ok(text.trim().to_string())
    }

    async fn extract_pdf(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        let layer_bytes = bytes.clone();
        let pages = run_blocking(move || pdf::extract_page_texts(&layer_bytes)).await?;
        let text = pdf::join_pages(&pages);

        if !text.trim().is_empty() {
            return Ok(text);
        }

        info!(pages = pages.len(), "PDF has no text layer, falling back to OCR");
        Ok(self.ocr.ocr_pdf(&bytes).await?)
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ExtractionError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ExtractionError::Decode(format!("file is not valid UTF-8: {e}")))
}

/// Runs a parser on the blocking pool. A parser panic becomes `Failed`.
async fn run_blocking<T, F>(f: F) -> Result<T, ExtractionError>
where
    F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ExtractionError::Failed(format!(
            "parser crashed: {}",
            panic_message(e.into_panic())
        ))),
        Err(e) => Err(ExtractionError::Internal(anyhow::anyhow!(
            "extraction task failed: {e}"
        ))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
