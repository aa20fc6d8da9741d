//! # Cogbench Runner
//!
//! Headless experiment execution: renders prompts for every example in the
//! configured data files, fans the repeated generation calls out to a
//! provider with bounded concurrency, and writes one results file per
//! input file.
//!
//! ## Example
//!
//! ```no_run
//! use cogbench_core::{
//!     ExperimentConfig, PromptType, ProviderKind, ProviderRegistry, TaskType,
//! };
//! use cogbench_runner::ExperimentRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExperimentConfig::new(
//!     ProviderKind::Ollama,
//!     "llama3.2",
//!     TaskType::Nli,
//!     PromptType::Direct,
//! )
//! .with_input_files(vec!["causal.json".to_string()]);
//!
//! let client = ProviderRegistry::builtin().create(&config)?;
//! let runner = ExperimentRunner::new(config, client, ".");
//! let summary = runner.run().await?;
//! println!("Wrote {} results files", summary.files_written.len());
//! # Ok(())
//! # }
//! ```

pub mod runner;

// Re-export public API
pub use runner::{ExperimentRunner, RunError, RunProgress, RunSummary};
