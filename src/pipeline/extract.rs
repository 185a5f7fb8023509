//! Text extraction: PDF bytes → page-ordered plain text.
//!
//! The PDF is parsed entirely in memory with lopdf; no temp files are
//! written and no network is touched — this stage is a pure function over
//! the uploaded buffer.
//!
//! A structurally broken upload (not a PDF, corrupt xref) fails with
//! [`NotesError::UnreadablePdf`]. A *valid* PDF whose pages carry no text
//! layer is a successful extraction with `has_text = false`: downstream
//! treats that as "scanned document" and stops the pipeline with its own
//! diagnostic, distinct from a parse failure.

use crate::error::NotesError;
use lopdf::Document;
use tracing::debug;

/// The extracted text of one document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Per-page text, concatenated in page order with blank-line
    /// separators.
    pub raw_text: String,
    /// Number of pages in the document (including textless ones).
    pub page_count: usize,
    /// False when no page yielded any non-whitespace text.
    pub has_text: bool,
}

/// Joined between consecutive pages' text.
const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the text layer of a PDF held in memory.
///
/// Pages are visited in document order; a page yielding no text (or whose
/// content stream cannot be decoded) contributes nothing and is not an
/// error by itself.
pub fn extract(pdf_bytes: &[u8]) -> Result<ExtractedDocument, NotesError> {
    if pdf_bytes.is_empty() {
        return Err(NotesError::UnreadablePdf {
            detail: "empty upload".into(),
        });
    }

    let doc = Document::load_mem(pdf_bytes).map_err(|e| NotesError::UnreadablePdf {
        detail: e.to_string(),
    })?;

    // BTreeMap keyed by 1-based page number, so iteration is document order.
    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut parts: Vec<String> = Vec::with_capacity(page_count);
    for page_no in pages.keys() {
        match doc.extract_text(&[*page_no]) {
            Ok(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Err(e) => {
                // One undecodable page does not sink the document.
                debug!("page {page_no}: text extraction failed: {e}");
            }
        }
    }

    let raw_text = parts.join(PAGE_SEPARATOR);
    let has_text = !raw_text.trim().is_empty();
    debug!(
        "extracted {} chars across {} pages (has_text={})",
        raw_text.len(),
        page_count,
        has_text
    );

    Ok(ExtractedDocument {
        raw_text,
        page_count,
        has_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a minimal PDF with one page per entry in `page_texts`; an
    /// empty entry becomes a page with no text-showing operators.
    fn pdf_with_pages(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            if !text.is_empty() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content stream"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serialise test PDF");
        bytes
    }

    #[test]
    fn extracts_text_in_page_order() {
        let bytes = pdf_with_pages(&["alpha page one", "beta page two"]);
        let doc = extract(&bytes).expect("extract should succeed");

        assert_eq!(doc.page_count, 2);
        assert!(doc.has_text);
        let first = doc.raw_text.find("alpha").expect("first page text");
        let second = doc.raw_text.find("beta").expect("second page text");
        assert!(first < second, "page order not preserved: {}", doc.raw_text);
    }

    #[test]
    fn textless_pdf_reports_has_text_false() {
        let bytes = pdf_with_pages(&["", ""]);
        let doc = extract(&bytes).expect("valid container, no text");
        assert_eq!(doc.page_count, 2);
        assert!(!doc.has_text);
        assert!(doc.raw_text.trim().is_empty());
    }

    #[test]
    fn textless_page_contributes_nothing() {
        let bytes = pdf_with_pages(&["only page with words", ""]);
        let doc = extract(&bytes).unwrap();
        assert!(doc.has_text);
        assert_eq!(doc.raw_text.trim(), "only page with words");
    }

    #[test]
    fn empty_bytes_are_unreadable() {
        let err = extract(&[]).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert!(err.to_string().contains("Unreadable"));
    }

    #[test]
    fn non_pdf_bytes_are_unreadable() {
        let err = extract(b"<!DOCTYPE html><html></html>").unwrap_err();
        assert!(matches!(err, NotesError::UnreadablePdf { .. }));
    }
}
