use serde::{Deserialize, Serialize};

/// A contiguous span of extracted document text, the unit of retrieval.
///
/// Offsets and sizes are measured in characters, not bytes, so chunk
/// boundaries never land inside a UTF-8 code point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the document's chunk sequence.
    pub index: usize,
    /// Chunk text, including the overlap shared with the previous chunk.
    pub text: String,
    /// 1-based page the chunk starts on (1 for plain text files).
    pub page: usize,
    /// Character offset of the chunk start in the concatenated document text.
    pub char_offset: usize,
}

/// A retrieved chunk paired with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity in [-1, 1]; higher means more relevant.
    pub score: f32,
}
