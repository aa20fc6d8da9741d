//! Credential configuration file.
//!
//! Credentials live in a TOML file (`cogbench.toml` by default) with one
//! section per provider. Resolution order for the API key is command-line
//! flag, then config file, then the provider's environment variable.

use cogbench_core::{ConfigError, Credentials, ProviderKind};
use serde::Deserialize;
use std::path::Path;

/// Default config file, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cogbench.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub openai: KeySection,
    #[serde(default)]
    pub azure_openai: AzureSection,
    #[serde(default)]
    pub gemini: KeySection,
    #[serde(default)]
    pub ollama: OllamaSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeySection {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureSection {
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaSection {
    /// Ollama model tag, when it differs from the experiment model name
    pub model_name: Option<String>,
    pub host: Option<String>,
}

impl CliConfig {
    /// Load the config file, or defaults if it does not exist.
    ///
    /// A missing file is fine (credentials may come from flags or the
    /// environment); a file that exists but fails to parse is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ConfigError::Invalid(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Resolve credentials for a provider.
    ///
    /// `api_key_flag` (from the command line) wins over the config file,
    /// which wins over the provider's environment variable.
    pub fn credentials(&self, provider: ProviderKind, api_key_flag: Option<&str>) -> Credentials {
        let from_file = match provider {
            ProviderKind::OpenAi => self.openai.api_key.clone(),
            ProviderKind::AzureOpenAi => self.azure_openai.api_key.clone(),
            ProviderKind::Gemini => self.gemini.api_key.clone(),
            ProviderKind::Ollama => None,
        };
        let api_key = api_key_flag
            .map(str::to_string)
            .or(from_file)
            .or_else(|| env_api_key(provider));

        Credentials {
            api_key,
            api_version: self.azure_openai.api_version.clone(),
            endpoint: self.azure_openai.endpoint.clone(),
            ollama_model_name: self.ollama.model_name.clone(),
            ollama_host: self.ollama.host.clone(),
        }
    }
}

fn env_api_key(provider: ProviderKind) -> Option<String> {
    let var = match provider {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::AzureOpenAi => "AZURE_OPENAI_API_KEY",
        ProviderKind::Gemini => "GEMINI_API_KEY",
        ProviderKind::Ollama => return None,
    };
    std::env::var(var).ok().filter(|v| !v.is_empty())
}
