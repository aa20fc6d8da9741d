//! Provider registry mapping tags to client constructors.
//!
//! The registry stores constructor closures rather than client instances,
//! so credentials are validated once at startup and clients are built
//! fresh per experiment.

use super::{
    AzureOpenAiClient, GeminiClient, ModelClient, OllamaClient, OpenAiClient, ProviderClient,
    ProviderKind,
};
use crate::config::ExperimentConfig;
use crate::error::ConfigError;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor closure for a provider client.
pub type ProviderFactory =
    Arc<dyn Fn(&ExperimentConfig) -> Result<Box<dyn ModelClient>, ConfigError> + Send + Sync>;

/// Registry of available providers.
pub struct ProviderRegistry {
    factories: HashMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the full built-in provider set.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(ProviderKind::OpenAi.as_str(), |config| {
            let api_key = require(&config.credentials.api_key, "openai", "an API key")?;
            Ok(Box::new(OpenAiClient::new(&config.model_name, api_key)))
        });

        registry.register(ProviderKind::AzureOpenAi.as_str(), |config| {
            let api_key = require(&config.credentials.api_key, "azure-openai", "an API key")?;
            let api_version = require(
                &config.credentials.api_version,
                "azure-openai",
                "an API version",
            )?;
            let endpoint = require(
                &config.credentials.endpoint,
                "azure-openai",
                "an endpoint URL",
            )?;
            Ok(Box::new(AzureOpenAiClient::new(
                &config.model_name,
                api_key,
                api_version,
                endpoint,
            )))
        });

        registry.register(ProviderKind::Gemini.as_str(), |config| {
            let api_key = require(&config.credentials.api_key, "gemini", "an API key")?;
            Ok(Box::new(GeminiClient::new(&config.model_name, api_key)))
        });

        registry.register(ProviderKind::Ollama.as_str(), |config| {
            let model = config
                .credentials
                .ollama_model_name
                .clone()
                .unwrap_or_else(|| config.model_name.clone());
            let mut client = OllamaClient::new(model);
            if let Some(host) = &config.credentials.ollama_host {
                client = client.with_host(host);
            }
            Ok(Box::new(client))
        });

        registry
    }

    /// Register a provider factory.
    pub fn register<F>(&mut self, tag: &'static str, factory: F)
    where
        F: Fn(&ExperimentConfig) -> Result<Box<dyn ModelClient>, ConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(tag, Arc::new(factory));
    }

    /// Build a raw client for the config's provider.
    ///
    /// Fails with [`ConfigError::UnknownProvider`] for unregistered tags
    /// and [`ConfigError::MissingCredential`] when required credentials
    /// are absent.
    pub fn build(&self, config: &ExperimentConfig) -> Result<Box<dyn ModelClient>, ConfigError> {
        let tag = config.provider.as_str();
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| ConfigError::UnknownProvider(tag.to_string()))?;
        factory(config)
    }

    /// Build a [`ProviderClient`] with the config's retry policy attached.
    pub fn create(&self, config: &ExperimentConfig) -> Result<ProviderClient, ConfigError> {
        let inner = self.build(config)?;
        Ok(ProviderClient::new(inner, config.generation.clone()))
    }

    /// List registered tags, sorted alphabetically.
    pub fn list(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.factories.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn require<'a>(
    value: &'a Option<String>,
    provider: &'static str,
    what: &'static str,
) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential { provider, what })
}
