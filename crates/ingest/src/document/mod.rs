mod pdf;
mod txt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("PDF extraction failed: {0}")]
    PdfError(String),

    #[error("No extractable text in {0} (scanned or image-only document?)")]
    Empty(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For plain text, always 1.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    /// File type: "pdf" or "txt".
    pub file_type: String,
    /// Extracted pages in document order.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// All page text joined by blank lines, the form the chunker consumes.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Extract text from file bytes based on the filename's extension.
///
/// A successfully parsed document that yields no text at all (for example a
/// scanned PDF with no text layer) is an [`ExtractionError::Empty`], not an
/// empty result: there is nothing downstream could embed or retrieve.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    let pages = match ext.as_str() {
        "pdf" => pdf::extract_pdf(bytes)?,
        "txt" | "text" => txt::extract_txt(bytes)?,
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(ExtractionError::Empty(filename.to_string()));
    }

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type: ext,
        pages,
    })
}
