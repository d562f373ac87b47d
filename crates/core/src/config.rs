use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Chat models the OpenAI generation backend accepts. Other model names are
/// rejected at validation time rather than at the first API call.
pub const OPENAI_CHAT_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview"];

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            chunking: ChunkingConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            llm: LlmConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }

    /// Check cross-field constraints, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.llm.validate()?;
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  chunking:   size={} overlap={}",
            self.chunking.chunk_size,
            self.chunking.chunk_overlap
        );
        tracing::info!(
            "  retrieval:  top_k={} min_score={}",
            self.retrieval.top_k,
            self.retrieval.min_score
        );
        tracing::info!(
            "  embedding:  provider={} model={} dimensions={}",
            self.embedding.provider,
            self.embedding.model_label(),
            self.embedding.dimensions
        );
        tracing::info!(
            "  llm:        provider={} model={} temperature={}",
            self.llm.provider,
            self.llm.model_label(),
            self.llm.temperature
        );
        tracing::info!("  storage:    data_dir={}", self.storage.data_dir.display());
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks. Must stay below
    /// `chunk_size` or the window would never advance.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    fn from_env() -> Self {
        let d = Self::default();
        Self {
            chunk_size: env_usize("CHUNK_SIZE", d.chunk_size),
            chunk_overlap: env_usize("CHUNK_OVERLAP", d.chunk_overlap),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                option: "CHUNK_SIZE",
                reason: "must be greater than zero".into(),
            });
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::Invalid {
                option: "CHUNK_OVERLAP",
                reason: format!(
                    "must be smaller than CHUNK_SIZE ({} >= {})",
                    self.chunk_overlap, self.chunk_size
                ),
            });
        }
        Ok(())
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many chunks to hand the generator as context.
    pub top_k: usize,
    /// Relevance floor for retrieved chunks; 0.0 disables it.
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 0.0,
        }
    }
}

impl RetrievalConfig {
    fn from_env() -> Self {
        let d = Self::default();
        Self {
            top_k: env_usize("TOP_K", d.top_k),
            min_score: env_f32("MIN_SCORE", d.min_score),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid {
                option: "TOP_K",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(ConfigError::Invalid {
                option: "MIN_SCORE",
                reason: format!("must be between 0.0 and 1.0, got {}", self.min_score),
            });
        }
        Ok(())
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai" or "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub dimensions: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai_api_key: None,
            openai_base_url: None,
            openai_model: "text-embedding-3-small".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "nomic-embed-text".to_string(),
            dimensions: 1536,
            batch_size: 64,
        }
    }
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        let d = Self::default();
        Self {
            provider: env_or("EMBEDDING_PROVIDER", &d.provider),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            openai_model: env_or("EMBEDDING_MODEL", &d.openai_model),
            ollama_url: env_or("OLLAMA_URL", &d.ollama_url),
            ollama_model: env_or("OLLAMA_EMBEDDING_MODEL", &d.ollama_model),
            dimensions: env_usize("EMBEDDING_DIMENSIONS", d.dimensions),
            batch_size: env_usize("EMBEDDING_BATCH_SIZE", d.batch_size),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    pub fn model_label(&self) -> &str {
        match self.provider.as_str() {
            "ollama" => &self.ollama_model,
            _ => &self.openai_model,
        }
    }
}

// ── LLM (generation) ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" or "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            openai_api_key: None,
            openai_base_url: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    fn from_env() -> Self {
        let d = Self::default();
        Self {
            provider: env_or("LLM_PROVIDER", &d.provider),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            openai_model: env_or("OPENAI_MODEL", &d.openai_model),
            ollama_url: env_or("OLLAMA_URL", &d.ollama_url),
            ollama_model: env_or("OLLAMA_MODEL", &d.ollama_model),
            temperature: env_f32("LLM_TEMPERATURE", d.temperature),
            max_tokens: env_u32("LLM_MAX_TOKENS", d.max_tokens),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == "openai" && !OPENAI_CHAT_MODELS.contains(&self.openai_model.as_str()) {
            return Err(ConfigError::UnknownChoice {
                what: "OPENAI_MODEL",
                value: self.openai_model.clone(),
                expected: OPENAI_CHAT_MODELS.join(", "),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid {
                option: "LLM_TEMPERATURE",
                reason: format!("must be between 0.0 and 2.0, got {}", self.temperature),
            });
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    pub fn model_label(&self) -> &str {
        match self.provider.as_str() {
            "ollama" => &self.ollama_model,
            _ => &self.openai_model,
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for persisted collections.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.llm.openai_model, "gpt-3.5-turbo");
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut config = Config::default();
        config.chunking.chunk_overlap = 1000;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 999;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let chunking = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(chunking.validate().is_err());
    }

    #[test]
    fn zero_top_k_rejected() {
        let retrieval = RetrievalConfig {
            top_k: 0,
            min_score: 0.0,
        };
        assert!(retrieval.validate().is_err());
    }

    #[test]
    fn min_score_outside_unit_interval_rejected() {
        let retrieval = RetrievalConfig {
            top_k: 3,
            min_score: 1.5,
        };
        assert!(retrieval.validate().is_err());
    }

    #[test]
    fn unknown_openai_chat_model_rejected() {
        let mut llm = LlmConfig::default();
        llm.openai_model = "gpt-5-nano".to_string();
        let err = llm.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-5-nano"));
        assert!(err.to_string().contains("gpt-3.5-turbo"));
    }

    #[test]
    fn ollama_generation_model_not_constrained() {
        let mut llm = LlmConfig::default();
        llm.provider = "ollama".to_string();
        llm.ollama_model = "anything-goes".to_string();
        assert!(llm.validate().is_ok());
    }

    #[test]
    fn openai_unconfigured_without_key() {
        let llm = LlmConfig::default();
        assert!(!llm.is_configured());

        let mut with_key = LlmConfig::default();
        with_key.openai_api_key = Some("sk-test".to_string());
        assert!(with_key.is_configured());
    }
}
