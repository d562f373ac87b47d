use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use pdfchat_core::{Chunk, ScoredChunk};

/// Schema version for persisted collections. Older versions are treated as
/// stale and rebuilt rather than migrated.
pub const MANIFEST_VERSION: u32 = 1;

/// Manifest recording what a persisted collection was built from.
///
/// The `signature` is a SHA-256 hex digest of the source document bytes.
/// Together with the embedding model and the chunking parameters it allows a
/// cheap equality check to decide whether the collection can be reused or
/// must be rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionManifest {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Path of the source document at build time.
    pub document_path: PathBuf,
    /// SHA-256 hex digest of the document bytes at build time.
    pub signature: String,
    /// Identifier of the embedder the chunks were embedded with,
    /// e.g. `openai/text-embedding-3-small`.
    pub embedding_model: String,
    /// Dimensionality of the stored vectors.
    pub dimensions: usize,
    /// Chunk window size (characters) used at build time.
    pub chunk_size: usize,
    /// Chunk overlap (characters) used at build time.
    pub chunk_overlap: usize,
    /// Number of chunks in the collection.
    pub chunk_count: usize,
    /// ISO 8601 timestamp of when the collection was built.
    pub built_at: String,
}

impl CollectionManifest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_path: PathBuf,
        signature: String,
        embedding_model: String,
        dimensions: usize,
        chunk_size: usize,
        chunk_overlap: usize,
        chunk_count: usize,
    ) -> Self {
        Self {
            version: MANIFEST_VERSION,
            document_path,
            signature,
            embedding_model,
            dimensions,
            chunk_size,
            chunk_overlap,
            chunk_count,
            built_at: Utc::now().to_rfc3339(),
        }
    }

    /// Check whether this collection can be reused for the given inputs.
    ///
    /// Any mismatch means the collection must be rebuilt: changed document
    /// bytes, a different embedding model or dimensionality, different
    /// chunking parameters, or an older schema version.
    pub fn is_fresh(
        &self,
        signature: &str,
        embedding_model: &str,
        dimensions: usize,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> bool {
        self.version == MANIFEST_VERSION
            && self.signature == signature
            && self.embedding_model == embedding_model
            && self.dimensions == dimensions
            && self.chunk_size == chunk_size
            && self.chunk_overlap == chunk_overlap
    }
}

/// A chunk together with its embedding vector, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// The persisted set of (chunk, embedding) pairs for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorCollection {
    pub manifest: CollectionManifest,
    pub chunks: Vec<EmbeddedChunk>,
}

impl VectorCollection {
    /// The top `k` chunks by descending cosine similarity to `query`.
    ///
    /// Equal scores are broken by original chunk order. Returns fewer than
    /// `k` results when the collection holds fewer chunks.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, ec)| (i, cosine_similarity(&ec.embedding, query)))
            .collect();

        // Stable sort keeps equal scores in chunk order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].chunk.clone(),
                score,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero magnitude,
/// so degenerate inputs rank last instead of poisoning the sort with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Handle to one document's collection in the store.
///
/// [`VectorStore::handle`](crate::store::VectorStore::handle) creates an
/// unready handle with no data attached; the ingestion pipeline attaches the
/// built (or loaded) collection. Query code must check readiness before
/// searching.
#[derive(Debug, Clone)]
pub struct CollectionHandle {
    id: String,
    document_path: PathBuf,
    data: Option<Arc<VectorCollection>>,
}

impl CollectionHandle {
    pub(crate) fn new(id: String, document_path: PathBuf) -> Self {
        Self {
            id,
            document_path,
            data: None,
        }
    }

    /// Attach a built collection, making the handle ready.
    pub fn with_data(mut self, data: Arc<VectorCollection>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Whether a built collection is attached.
    pub fn is_ready(&self) -> bool {
        self.data.is_some()
    }

    /// The attached collection, if the handle is ready.
    pub fn collection(&self) -> Option<&VectorCollection> {
        self.data.as_deref()
    }
}
