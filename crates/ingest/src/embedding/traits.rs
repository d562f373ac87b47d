use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder not configured: {0}")]
    NotConfigured(String),
}

/// Trait for embedding backends (OpenAI, Ollama, test fakes).
///
/// Ingestion and query must go through the same embedder: vectors from
/// different models are not comparable. The collection manifest records
/// `model_id()` so that mixing spaces is caught instead of silently
/// returning nonsense similarities.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text (the query path).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Api("empty response for single input".to_string()))
    }

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Stable identifier of the embedding space, e.g.
    /// `openai/text-embedding-3-small`.
    fn model_id(&self) -> String;
}
