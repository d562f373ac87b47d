use super::{ExtractionError, PageContent};

pub(super) fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    Ok(pages_from_text(&text))
}

/// Split the raw extracted text into pages.
///
/// pdf-extract returns the whole document as one string with form feed
/// characters (\x0C) between pages. Blank pages are dropped but keep their
/// position: page numbers refer to the original document.
fn pages_from_text(text: &str) -> Vec<PageContent> {
    if text.contains('\x0C') {
        return text
            .split('\x0C')
            .enumerate()
            .filter(|(_, page_text)| !page_text.trim().is_empty())
            .map(|(i, page_text)| PageContent {
                page_number: i + 1,
                text: page_text.trim().to_string(),
            })
            .collect();
    }

    // No page breaks found, treat as a single page.
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![PageContent {
        page_number: 1,
        text: trimmed.to_string(),
    }]
}
