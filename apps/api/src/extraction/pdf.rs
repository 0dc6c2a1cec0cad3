//! Native PDF text layer extraction.

use super::ExtractionError;

/// Text of every page, in page order. Image-only pages come back empty.
pub fn extract_page_texts(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::Failed(format!("failed to parse PDF: {e}")))
}

/// Joins the non-blank pages with a newline.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
