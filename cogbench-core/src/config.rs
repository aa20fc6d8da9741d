//! Experiment and generation configuration.
//!
//! Configuration is explicit: values are constructed once and passed into
//! components, never read from process-wide state.

use crate::provider::ProviderKind;
use crate::task::{PromptType, TaskType};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sampling and retry settings for provider generation calls.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GenerationConfig {
    /// Maximum tokens per response
    ///
    /// Default: 2000
    pub max_tokens: u32,

    /// Sampling temperature
    ///
    /// Default: 1.0
    pub temperature: f32,

    /// Timeout for an individual generation request
    ///
    /// Default: 60 seconds
    pub timeout: Duration,

    /// Maximum number of retries on transient failures
    ///
    /// This is the number of *additional* attempts after the initial try.
    /// Default: 3
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    ///
    /// Default: 1000ms
    pub retry_base_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 1.0,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    /// Retry delay for a given attempt number (0-indexed).
    ///
    /// Exponential backoff, capped at 60 seconds.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        const MAX_DELAY_MS: u64 = 60_000;

        let delay_ms = self
            .retry_base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_DELAY_MS);

        Duration::from_millis(delay_ms)
    }
}

/// Provider credentials and endpoint overrides.
///
/// Only the fields the selected provider needs have to be present; the
/// provider registry validates them at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// API key (OpenAI, Azure OpenAI, Gemini)
    pub api_key: Option<String>,
    /// API version (Azure OpenAI)
    pub api_version: Option<String>,
    /// Endpoint URL (Azure OpenAI)
    pub endpoint: Option<String>,
    /// Ollama model name, when it differs from the experiment model name
    pub ollama_model_name: Option<String>,
    /// Ollama host URL (default: http://localhost:11434)
    pub ollama_host: Option<String>,
}

/// Full configuration for one experiment invocation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ExperimentConfig {
    /// Which provider to call
    pub provider: ProviderKind,
    /// Model name, e.g. "gpt-4o" or "gemini-2.5-pro"
    pub model_name: String,
    /// Task being run
    pub task: TaskType,
    /// Prompting strategy
    pub prompt_type: PromptType,
    /// Directory containing input data files
    pub data_dir: PathBuf,
    /// Directory to write results files into
    pub output_dir: PathBuf,
    /// Input JSON data files (names relative to `data_dir`)
    pub input_files: Vec<String>,
    /// Repeated generations per example
    ///
    /// Default: 10
    pub num_runs: usize,
    /// Maximum in-flight generation calls
    ///
    /// Default: 4
    pub concurrency: usize,
    /// Generation sampling and retry settings
    pub generation: GenerationConfig,
    /// Provider credentials
    pub credentials: Credentials,
}

impl ExperimentConfig {
    pub fn new(
        provider: ProviderKind,
        model_name: impl Into<String>,
        task: TaskType,
        prompt_type: PromptType,
    ) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            task,
            prompt_type,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("results"),
            input_files: Vec::new(),
            num_runs: 10,
            concurrency: 4,
            generation: GenerationConfig::default(),
            credentials: Credentials::default(),
        }
    }

    #[must_use]
    pub fn with_dirs(mut self, data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_input_files(mut self, files: Vec<String>) -> Self {
        self.input_files = files;
        self
    }

    #[must_use]
    pub fn with_num_runs(mut self, num_runs: usize) -> Self {
        self.num_runs = num_runs.max(1);
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Path to the prompt template: `<root>/prompts/<task>/<prompt_type>.txt`.
    pub fn prompt_path(&self, project_root: &Path) -> PathBuf {
        project_root
            .join("prompts")
            .join(self.task.as_str())
            .join(self.prompt_type.template_filename())
    }

    /// Results filename for a data file: `<stem>_res.json` or
    /// `<stem>_cot_res.json`.
    pub fn output_filename(&self, data_filename: &str) -> String {
        let stem = Path::new(data_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(data_filename);
        format!("{}_{}.json", stem, self.prompt_type.results_suffix())
    }
}
