//! Document ingestion: text extraction, chunking, embedding, and the
//! build-or-load pipeline that turns a source document into a queryable
//! vector collection.

pub mod chunker;
pub mod document;
pub mod embedding;
pub mod pipeline;

pub use chunker::chunk_document;
pub use document::{extract_text, ExtractedDocument, ExtractionError, PageContent};
pub use embedding::{create_embedder, Embedder, EmbeddingError, OllamaEmbedder, OpenAiEmbedder};
pub use pipeline::{IngestError, IngestPipeline};
