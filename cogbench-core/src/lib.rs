//! # Cogbench Core
//!
//! Shared types for the cogbench benchmark harness: task and label
//! definitions, dataset loading, prompt templates, provider clients, and
//! experiment configuration.
//!
//! ## Architecture
//!
//! - **Providers behind a trait**: every backend implements [`ModelClient`];
//!   retry, backoff and timeout policy live in [`ProviderClient`], so
//!   providers stay thin HTTP wrappers
//! - **Explicit configuration**: [`ExperimentConfig`] is constructed once
//!   and passed down, never read from process-wide state
//! - **Typed labels**: responses are parsed into [`Label`] values, never
//!   compared as raw strings downstream
//!
//! ## Example
//!
//! ```no_run
//! use cogbench_core::{
//!     ExperimentConfig, PromptType, ProviderKind, ProviderRegistry, TaskType,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExperimentConfig::new(
//!     ProviderKind::Ollama,
//!     "llama3.2",
//!     TaskType::Nli,
//!     PromptType::Direct,
//! );
//!
//! let client = ProviderRegistry::builtin().create(&config)?;
//! let response = client.generate("Premise: ... Statement: ... Output:").await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod task;

// Re-export public API
pub use config::{Credentials, ExperimentConfig, GenerationConfig};
pub use data::{DataError, Example, ExampleSet, ResultsFile, RunRecord};
pub use error::{ConfigError, ProviderError};
pub use prompt::PromptTemplate;
pub use provider::{
    AzureOpenAiClient, GeminiClient, GenerationOptions, ModelClient, OllamaClient, OpenAiClient,
    ProviderClient, ProviderKind, ProviderRegistry, SYSTEM_PROMPT,
};
pub use task::{Label, ParseEnumError, PromptType, TaskType};
