//! Build-or-load pipeline producing a ready [`CollectionHandle`] for one
//! document.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use pdfchat_core::config::ChunkingConfig;
use pdfchat_core::ConfigError;
use pdfchat_store::{
    CollectionHandle, CollectionManifest, EmbeddedChunk, StoreError, VectorCollection, VectorStore,
};

use crate::chunker::chunk_document;
use crate::document::{extract_text, ExtractionError};
use crate::embedding::{Embedder, EmbeddingError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Builds, persists, and reuses the vector collection for a document.
///
/// Reuse is the point: embedding costs money and minutes, so an existing
/// collection whose manifest still matches the document bytes, the embedding
/// model, and the chunking parameters is loaded without a single embedder
/// call. Any mismatch, including a corrupt file on disk, triggers a full
/// rebuild.
#[derive(Debug)]
pub struct IngestPipeline {
    chunking: ChunkingConfig,
    batch_size: usize,
    embedder: Arc<dyn Embedder>,
    store: VectorStore,
}

impl IngestPipeline {
    /// Create a pipeline. Fails when the chunking parameters are
    /// inconsistent (zero size, or overlap >= size).
    pub fn new(
        chunking: ChunkingConfig,
        batch_size: usize,
        embedder: Arc<dyn Embedder>,
        store: VectorStore,
    ) -> Result<Self, IngestError> {
        chunking.validate()?;
        Ok(Self {
            chunking,
            batch_size: batch_size.max(1),
            embedder,
            store,
        })
    }

    /// Load the persisted collection for `document_path` if it is still
    /// fresh, otherwise (re)build it. Returns a ready handle either way.
    pub async fn build_or_load(&self, document_path: &Path) -> Result<CollectionHandle, IngestError> {
        let (bytes, signature) = self.read_document(document_path)?;
        let handle = self.store.handle(document_path);

        match self.store.load(handle.id()) {
            Ok(Some(existing)) => {
                if existing.manifest.is_fresh(
                    &signature,
                    &self.embedder.model_id(),
                    self.embedder.dimensions(),
                    self.chunking.chunk_size,
                    self.chunking.chunk_overlap,
                ) {
                    info!(
                        id = handle.id(),
                        chunks = existing.chunks.len(),
                        "Reusing persisted collection"
                    );
                    return Ok(handle.with_data(Arc::new(existing)));
                }
                info!(id = handle.id(), "Persisted collection is stale, rebuilding");
            }
            Ok(None) => {
                debug!(id = handle.id(), "No persisted collection, building");
            }
            Err(e) => {
                // Damaged data is recovered by rebuilding, never by failing.
                warn!(id = handle.id(), error = %e, "Could not load persisted collection, rebuilding");
            }
        }

        let collection = self.build(document_path, &bytes, signature).await?;
        self.store.save(handle.id(), &collection)?;
        Ok(handle.with_data(Arc::new(collection)))
    }

    /// Discard any persisted collection for `document_path` and build anew.
    pub async fn rebuild(&self, document_path: &Path) -> Result<CollectionHandle, IngestError> {
        let (bytes, signature) = self.read_document(document_path)?;
        let handle = self.store.handle(document_path);
        self.store.delete(handle.id())?;

        let collection = self.build(document_path, &bytes, signature).await?;
        self.store.save(handle.id(), &collection)?;
        Ok(handle.with_data(Arc::new(collection)))
    }

    /// Read the document bytes once; they serve both the content signature
    /// and extraction.
    fn read_document(&self, path: &Path) -> Result<(Vec<u8>, String), IngestError> {
        if !path.is_file() {
            return Err(IngestError::DocumentNotFound(path.display().to_string()));
        }
        let bytes = fs::read(path).map_err(ExtractionError::Io)?;
        let digest = Sha256::digest(&bytes);
        Ok((bytes, format!("{digest:x}")))
    }

    async fn build(
        &self,
        path: &Path,
        bytes: &[u8],
        signature: String,
    ) -> Result<VectorCollection, IngestError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let doc = extract_text(bytes, &filename)?;
        info!(
            file = %filename,
            pages = doc.pages.len(),
            chars = doc.total_chars(),
            "Extracted document text"
        );

        let chunks = chunk_document(&doc, &self.chunking);
        info!(chunks = chunks.len(), "Chunked document");

        // Batches preserve order, so chunk i pairs with vector i.
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let mut embeddings = Vec::with_capacity(chunks.len());
        let total_batches = texts.len().div_ceil(self.batch_size);
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!(batch = i + 1, of = total_batches, size = batch.len(), "Embedding batch");
            let vectors = self.embedder.embed_batch(batch).await?;
            embeddings.extend(vectors);
        }

        if embeddings.len() != chunks.len() {
            return Err(IngestError::Embedding(EmbeddingError::Api(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            ))));
        }

        let manifest = CollectionManifest::new(
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()),
            signature,
            self.embedder.model_id(),
            self.embedder.dimensions(),
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
            chunks.len(),
        );

        let chunks = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();

        Ok(VectorCollection { manifest, chunks })
    }
}
