//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so the
//! Tokio worker threads never stall while a large document is parsed.
//!
//! The library itself is resolved through `pdfium-auto`: `PDFIUM_LIB_PATH`
//! if set, otherwise a cached download.

use crate::error::Idea2AppError;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Extract the text of every page, in page order.
///
/// Pages with no extractable text (scans, pure images) contribute nothing;
/// they are not an error.
pub async fn extract_text(bytes: Vec<u8>) -> Result<String, Idea2AppError> {
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes))
        .await
        .map_err(|e| Idea2AppError::Internal(format!("PDF extraction task panicked: {}", e)))?
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(bytes: &[u8]) -> Result<String, Idea2AppError> {
    let pdfium = pdfium_auto::bind_pdfium_silent()
        .map_err(|e| Idea2AppError::PdfiumBindingFailed(e.to_string()))?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| Idea2AppError::CorruptPdf {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let texts = pages.iter().enumerate().map(|(idx, page)| match page.text() {
        Ok(text) => Some(text.all()),
        Err(e) => {
            debug!("Page {}: no extractable text ({:?})", idx + 1, e);
            None
        }
    });

    Ok(join_page_texts(texts))
}

/// Concatenate per-page text in order.
///
/// Empty or missing pages are skipped entirely, so a document whose later
/// pages are blank reads exactly like one without them.
///
/// Unlike plain back-to-back concatenation, a `\n` is inserted between two
/// contributing pages when the earlier one does not already end in one.
/// This is an intentional departure: without it a `Key:` at the top of a
/// page would be glued onto the last line of the previous page and lost
/// as a key.
pub fn join_page_texts<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut out = String::new();
    for text in pages.into_iter().flatten() {
        if text.trim().is_empty() {
            continue;
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&text);
    }
    debug!("Extracted {} chars of PDF text", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fields::extract_fields;

    #[test]
    fn blank_second_page_contributes_nothing() {
        let page1 = "Project name: Foo\nDescription: A simple app".to_string();
        let with_blank = join_page_texts(vec![Some(page1.clone()), None]);
        let with_empty = join_page_texts(vec![Some(page1.clone()), Some("  \n".into())]);
        let alone = join_page_texts(vec![Some(page1.clone())]);

        assert_eq!(with_blank, page1);
        assert_eq!(with_empty, page1);
        assert_eq!(extract_fields(&with_blank), extract_fields(&alone));
    }

    #[test]
    fn pages_start_on_new_lines() {
        let joined = join_page_texts(vec![
            Some("Project name: Foo".into()),
            Some("Platforms: iOS\n".into()),
            Some("Color Scheme: teal".into()),
        ]);
        assert_eq!(joined, "Project name: Foo\nPlatforms: iOS\nColor Scheme: teal");
    }

    #[test]
    fn no_pages_is_empty_text() {
        assert_eq!(join_page_texts(Vec::<Option<String>>::new()), "");
    }
}
