//! Raw text extraction from Word documents.

use docx_rs::{
    read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::ExtractionError;

/// Paragraph text in document order, one blank line between paragraphs.
/// Table cells contribute their paragraphs in row-major order. Content
/// controls and tracked insertions are read through like ordinary content.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes)
        .map_err(|e| ExtractionError::Failed(format!("failed to parse DOCX: {e}")))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => paragraphs.push(paragraph_text(p)),
            DocumentChild::Table(t) => collect_table(t, &mut paragraphs),
            DocumentChild::StructuredDataTag(sdt) => collect_block_sdt(sdt, &mut paragraphs),
            _ => {}
        }
    }

    Ok(paragraphs.join("\n\n"))
}

fn collect_table(table: &Table, out: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => out.push(paragraph_text(p)),
                    TableCellContent::Table(t) => collect_table(t, out),
                    TableCellContent::StructuredDataTag(sdt) => collect_block_sdt(sdt, out),
                    _ => {}
                }
            }
        }
    }
}

/// A block-level content control. Bare runs directly under the control are
/// gathered into one paragraph.
fn collect_block_sdt(sdt: &StructuredDataTag, out: &mut Vec<String>) {
    let mut loose = String::new();
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, &mut loose),
            StructuredDataTagChild::Paragraph(p) => {
                flush(&mut loose, out);
                out.push(paragraph_text(p));
            }
            StructuredDataTagChild::Table(t) => {
                flush(&mut loose, out);
                collect_table(t, out);
            }
            StructuredDataTagChild::StructuredDataTag(inner) => {
                flush(&mut loose, out);
                collect_block_sdt(inner, out);
            }
            _ => {}
        }
    }
    flush(&mut loose, out);
}

fn flush(loose: &mut String, out: &mut Vec<String>) {
    if !loose.is_empty() {
        out.push(std::mem::take(loose));
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&paragraph.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(run, text);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(sdt) => push_inline_sdt(sdt, text),
            _ => {}
        }
    }
}

fn push_inline_sdt(sdt: &StructuredDataTag, text: &mut String) {
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, text),
            StructuredDataTagChild::Paragraph(p) => push_children(&p.children, text),
            StructuredDataTagChild::StructuredDataTag(inner) => push_inline_sdt(inner, text),
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
