use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{Embedder, EmbeddingError};

/// Embedder backed by a local Ollama instance.
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(url: String, model: String, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            url,
            model,
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(batch = texts.len(), model = %self.model, "Requesting embeddings");

        let request = OllamaEmbedRequest {
            model: self.model.clone(),
            input: texts.iter().map(|s| s.to_string()).collect(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: OllamaEmbedResponse = response.json().await?;

        if let Some(first) = parsed.embeddings.first() {
            if first.len() != self.dimensions {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: first.len(),
                });
            }
        }

        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> String {
        format!("ollama/{}", self.model)
    }
}
