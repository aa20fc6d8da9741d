//! Ollama chat client for locally hosted models.

use super::{GenerationOptions, ModelClient, SYSTEM_PROMPT};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    http: reqwest::Client,
    /// Actual Ollama model tag, e.g. "llama3.2:latest"
    model: String,
    host: String,
}

impl OllamaClient {
    /// Create a client for `model` on the default local host.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
            host: DEFAULT_HOST.to_string(),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.host.trim_end_matches('/')))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let text = body.message.content.trim();
        if text.is_empty() {
            return Err(ProviderError::NoContent);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "llama3.2:latest",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "classify",
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: 1.0,
                num_predict: 2000,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:latest");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"model": "llama3.2", "message": {"role": "assistant", "content": "contradiction"}, "done": true}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.message.content, "contradiction");
    }

    #[test]
    fn test_default_host() {
        let client = OllamaClient::new("llama3.2");
        assert_eq!(client.host, DEFAULT_HOST);

        let client = OllamaClient::new("llama3.2").with_host("http://box:11434/");
        assert_eq!(client.host, "http://box:11434/");
    }
}
