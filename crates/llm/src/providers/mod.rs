pub mod ollama;
pub mod openai;

use pdfchat_core::config::LlmConfig;

use crate::provider::{Generator, LlmError};

/// Create the appropriate generation backend based on config.
///
/// Missing credentials or an unknown provider fail here, before the first
/// completion request.
pub fn create_generator(config: &LlmConfig) -> Result<Box<dyn Generator>, LlmError> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiGenerator::new(
                api_key.clone(),
                config.openai_model.clone(),
                base_url.to_string(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaGenerator::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_without_key_fails_before_any_request() {
        let config = LlmConfig::default();
        let err = create_generator(&config).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn openai_with_key_builds() {
        let mut config = LlmConfig::default();
        config.openai_api_key = Some("sk-test".to_string());
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_id(), "gpt-3.5-turbo");
    }

    #[test]
    fn ollama_needs_no_credentials() {
        let mut config = LlmConfig::default();
        config.provider = "ollama".to_string();
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.model_id(), "llama3.2");
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut config = LlmConfig::default();
        config.provider = "bedrock".to_string();
        let err = create_generator(&config).unwrap_err();
        assert!(err.to_string().contains("bedrock"));
    }
}
