//! OpenAI and Azure OpenAI chat-completions clients.

use super::{GenerationOptions, ModelClient, SYSTEM_PROMPT};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn messages<'a>(prompt: &'a str) -> [ChatMessage<'a>; 2] {
    [
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        },
        ChatMessage {
            role: "user",
            content: prompt,
        },
    ]
}

async fn parse_chat_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::RateLimit(message));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body: ChatResponse = response.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(ProviderError::NoContent)
}

/// Client for the OpenAI chat-completions API.
pub struct OpenAiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (for compatible endpoints and tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages(prompt),
            max_completion_tokens: Some(options.max_tokens),
            max_tokens: None,
            temperature: options.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        parse_chat_response(response).await
    }
}

/// Client for the Azure OpenAI chat-completions API.
///
/// Azure routes requests by deployment name rather than model name; the
/// deployments this harness targets are prefixed with `lunar-`.
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    deployment: String,
    api_key: String,
    api_version: String,
    endpoint: String,
}

impl AzureOpenAiClient {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            deployment: format!("lunar-{}", model.into()),
            api_key: api_key.into(),
            api_version: api_version.into(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl ModelClient for AzureOpenAiClient {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.deployment,
            messages: messages(prompt),
            max_completion_tokens: None,
            max_tokens: Some(options.max_tokens),
            temperature: options.temperature,
        };

        let response = self
            .http
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        parse_chat_response(response).await
    }
}
