//! Plain text → DOCX, entirely in memory.

pub mod handlers;

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use thiserror::Error;

pub const DOCX_FILENAME: &str = "cover_letter.docx";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no text provided")]
    MissingText,

    #[error("failed to write document: {0}")]
    Pack(String),
}

/// Splits text into paragraphs on blank lines; with no blank line present,
/// every non-empty line is its own paragraph. Segments are trimmed and empty
/// ones dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.lines().collect();

    if !lines.iter().any(|line| line.trim().is_empty()) {
        return lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            flush(&mut current, &mut paragraphs);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut paragraphs);
    paragraphs
}

fn flush(current: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    let joined = current.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    current.clear();
}

/// Builds a DOCX with one paragraph per segment of `text`.
/// Newlines left inside a segment become line breaks.
pub fn build_docx(text: &str) -> Result<Vec<u8>, DocumentError> {
    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return Err(DocumentError::MissingText);
    }

    let docx = paragraphs
        .iter()
        .fold(Docx::new(), |docx, para| docx.add_paragraph(paragraph(para)));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| DocumentError::Pack(e.to_string()))?;
    Ok(buf.into_inner())
}

fn paragraph(text: &str) -> Paragraph {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    Paragraph::new().add_run(run)
}
