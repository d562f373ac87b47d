//! Sliding-window chunker.
//!
//! Splits the concatenated page text into fixed-size character windows: each
//! chunk spans `chunk_size` characters and starts `chunk_size -
//! chunk_overlap` characters after the previous one, so consecutive chunks
//! share exactly `chunk_overlap` characters. The window that reaches the end
//! of the text is the last one, and it may be shorter than `chunk_size`.
//! The same text and config always produce the same chunk sequence.

use pdfchat_core::config::ChunkingConfig;
use pdfchat_core::Chunk;

use crate::document::ExtractedDocument;

/// Separator inserted between pages when concatenating extracted text.
const PAGE_SEPARATOR: &str = "\n\n";

/// Split an extracted document into overlapping chunks.
///
/// All offsets and sizes are measured in characters, never bytes, so a
/// window boundary cannot land inside a multi-byte code point. Each chunk
/// records the page its first character falls on.
///
/// The config must already be validated (`chunk_overlap < chunk_size`); the
/// pipeline enforces that at construction.
pub fn chunk_document(doc: &ExtractedDocument, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut text = String::new();
    // (char offset where the page starts, 1-based page number)
    let mut page_starts: Vec<(usize, usize)> = Vec::with_capacity(doc.pages.len());
    let mut char_len = 0usize;

    for page in &doc.pages {
        if !text.is_empty() {
            text.push_str(PAGE_SEPARATOR);
            char_len += PAGE_SEPARATOR.chars().count();
        }
        page_starts.push((char_len, page.page_number));
        text.push_str(&page.text);
        char_len += page.text.chars().count();
    }

    chunk_text(&text, char_len, &page_starts, config)
}

fn chunk_text(
    text: &str,
    char_len: usize,
    page_starts: &[(usize, usize)],
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary plus the end, so char-indexed
    // windows can slice the backing string directly.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    boundaries.push(text.len());

    let stride = config.chunk_size - config.chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < char_len {
        let end = (start + config.chunk_size).min(char_len);
        chunks.push(Chunk {
            index: chunks.len(),
            text: text[boundaries[start]..boundaries[end]].to_string(),
            page: page_for_offset(page_starts, start),
            char_offset: start,
        });
        if end == char_len {
            break;
        }
        start += stride;
    }

    chunks
}

/// The page whose span contains the given character offset (1 when there
/// are no pages at all).
fn page_for_offset(page_starts: &[(usize, usize)], offset: usize) -> usize {
    let mut page = page_starts.first().map(|&(_, p)| p).unwrap_or(1);
    for &(start, number) in page_starts {
        if start <= offset {
            page = number;
        } else {
            break;
        }
    }
    page
}
