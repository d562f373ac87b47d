use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::provider::{Generator, LlmError, Message, Role};

#[derive(Debug)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
        }
    }
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let body = json!({
            "model": self.model,
            "messages": api_messages,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        });

        debug!(model = %self.model, "Ollama request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let text = response.text().await?;
        let parsed: OllamaChatResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::ParseError(format!("chat response body: {e}")))?;

        Ok(parsed.message.content)
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}
