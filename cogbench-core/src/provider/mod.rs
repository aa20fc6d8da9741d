//! Model provider clients.
//!
//! Each provider is a thin HTTP wrapper implementing [`ModelClient`];
//! [`ProviderClient`] adds the retry/backoff/timeout policy shared by all
//! of them, and [`registry::ProviderRegistry`] maps provider tags to
//! constructors.

mod gemini;
mod ollama;
mod openai;
pub mod registry;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::{AzureOpenAiClient, OpenAiClient};
pub use registry::ProviderRegistry;

use crate::config::GenerationConfig;
use crate::error::ProviderError;
use crate::task::ParseEnumError;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// System prompt sent with every chat request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// The closed set of supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    AzureOpenAi,
    Gemini,
    Ollama,
}

impl ProviderKind {
    /// All supported providers, in registration order.
    pub fn all() -> &'static [ProviderKind] {
        &[
            ProviderKind::OpenAi,
            ProviderKind::AzureOpenAi,
            ProviderKind::Gemini,
            ProviderKind::Ollama,
        ]
    }

    /// The tag used on the command line and in results directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::AzureOpenAi => "azure-openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            // Accept both spellings; the original config used an underscore.
            "azure-openai" | "azure_openai" => Ok(ProviderKind::AzureOpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(ParseEnumError {
                kind: "provider",
                value: s.to_string(),
                valid: "openai, azure-openai, gemini, ollama",
            }),
        }
    }
}

/// Per-request sampling options passed to a provider.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Capability interface for a model provider.
///
/// Implementations are thin, stateless HTTP wrappers: one prompt in, one
/// raw text response out. Retry and timeout policy belongs to
/// [`ProviderClient`], not to implementations.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider tag, used in logs.
    fn name(&self) -> &str;

    /// Generate one response for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;
}

/// A [`ModelClient`] with the shared retry/backoff/timeout policy.
///
/// Transient failures (timeouts, rate limits, 5xx, transport errors) are
/// retried up to `config.max_retries` times with capped exponential
/// backoff; everything else surfaces immediately.
pub struct ProviderClient {
    inner: Box<dyn ModelClient>,
    config: GenerationConfig,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &self.inner.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ProviderClient {
    pub fn new(inner: Box<dyn ModelClient>, config: GenerationConfig) -> Self {
        Self { inner, config }
    }

    /// Provider tag of the wrapped client.
    pub fn provider_name(&self) -> &str {
        self.inner.name()
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate one response, retrying transient failures.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "Prompt cannot be empty".to_string(),
            ));
        }

        let options = GenerationOptions::from(&self.config);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.generate_once(prompt, &options).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    log::warn!(
                        "{} request failed (attempt {}/{}): {}, retrying...",
                        self.inner.name(),
                        attempt + 1,
                        self.config.max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Other("Retry loop exited unexpectedly".to_string())))
    }

    /// Execute a single request with the configured timeout (no retries).
    async fn generate_once(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let timeout = self.config.timeout;
        let response = tokio::time::timeout(timeout, self.inner.generate(prompt, options))
            .await
            .map_err(|_| ProviderError::Timeout(timeout.as_millis() as u64))??;

        let text = response.trim();
        if text.is_empty() {
            return Err(ProviderError::NoContent);
        }
        Ok(text.to_string())
    }
}
