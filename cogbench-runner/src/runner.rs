//! Experiment execution: repeated generation calls fanned out per example.
//!
//! For each input data file, every example is rendered into a prompt and
//! sent `num_runs` times. Calls run concurrently up to the configured
//! limit; responses are reassembled in run order per example and written
//! as one results file per input file.

use cogbench_core::{
    ConfigError, DataError, ExampleSet, ExperimentConfig, PromptTemplate, ProviderClient,
    ResultsFile, RunRecord,
};
use futures_util::{stream, StreamExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Errors executing an experiment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("No input files configured")]
    NoInputFiles,

    #[error("Failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Progress events emitted while an experiment runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProgress {
    /// An input file was loaded and its calls are about to start.
    FileStarted {
        file: String,
        examples: usize,
        total_calls: usize,
    },
    /// One generation call finished (in completion order, not run order).
    CallFinished { succeeded: bool },
    /// A results file was written.
    FileWritten { path: PathBuf },
}

/// Summary of a completed experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Results files written, in input order
    pub files_written: Vec<PathBuf>,
    /// Total generation calls attempted
    pub total_calls: usize,
    /// Calls that exhausted retries and were recorded as error placeholders
    pub failed_calls: usize,
}

/// Executes one experiment configuration against a provider.
pub struct ExperimentRunner {
    config: ExperimentConfig,
    client: Arc<ProviderClient>,
    project_root: PathBuf,
}

impl ExperimentRunner {
    pub fn new(
        config: ExperimentConfig,
        client: ProviderClient,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            client: Arc::new(client),
            project_root: project_root.into(),
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run the experiment over all configured input files.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        self.run_with_progress(|_| {}).await
    }

    /// Run the experiment, reporting progress through a callback.
    ///
    /// A failed call is not an error here: after the provider's retries
    /// are exhausted the failure is recorded in the results file as an
    /// `ERROR: ...` placeholder response, and the run continues.
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> Result<RunSummary, RunError>
    where
        F: FnMut(RunProgress),
    {
        if self.config.input_files.is_empty() {
            return Err(RunError::NoInputFiles);
        }

        let template = PromptTemplate::load(&self.config.prompt_path(&self.project_root)).await?;

        let output_dir = self.config.output_dir.join(&self.config.model_name);
        fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| RunError::Io {
                path: output_dir.clone(),
                source,
            })?;

        let mut summary = RunSummary::default();
        for file in &self.config.input_files {
            let written = self
                .run_file(file, &template, &output_dir, &mut summary, &mut on_progress)
                .await?;
            summary.files_written.push(written);
        }

        log::info!(
            "Experiment finished: {} calls, {} failed, {} files written",
            summary.total_calls,
            summary.failed_calls,
            summary.files_written.len()
        );
        Ok(summary)
    }

    async fn run_file<F>(
        &self,
        file: &str,
        template: &PromptTemplate,
        output_dir: &Path,
        summary: &mut RunSummary,
        on_progress: &mut F,
    ) -> Result<PathBuf, RunError>
    where
        F: FnMut(RunProgress),
    {
        let data_path = self.config.data_dir.join(file);
        let examples = ExampleSet::load(&data_path).await?;
        let num_runs = self.config.num_runs;

        log::info!(
            "Running {}: {} examples x {} runs on {}",
            file,
            examples.len(),
            num_runs,
            self.config.model_name
        );
        on_progress(RunProgress::FileStarted {
            file: file.to_string(),
            examples: examples.len(),
            total_calls: examples.len() * num_runs,
        });

        // One job per (example, run index); responses are reassembled in
        // run order after the unordered fan-out completes.
        let jobs: Vec<(String, usize, String)> = examples
            .examples
            .iter()
            .flat_map(|(id, example)| {
                (0..num_runs).map(move |run_index| {
                    (
                        id.clone(),
                        run_index,
                        template.render(&example.premise, &example.statement),
                    )
                })
            })
            .collect();

        let client = &self.client;
        let mut calls = stream::iter(jobs)
            .map(|(id, run_index, prompt)| async move {
                let outcome = client.generate(&prompt).await;
                (id, run_index, outcome)
            })
            .buffer_unordered(self.config.concurrency);

        let mut responses: BTreeMap<String, Vec<String>> = examples
            .examples
            .keys()
            .map(|id| (id.clone(), vec![String::new(); num_runs]))
            .collect();

        while let Some((id, run_index, outcome)) = calls.next().await {
            summary.total_calls += 1;
            let succeeded = outcome.is_ok();
            let text = match outcome {
                Ok(text) => text,
                Err(e) => {
                    summary.failed_calls += 1;
                    log::warn!("Call failed for example {id} run {run_index}: {e}");
                    format!("ERROR: {e}")
                }
            };
            if let Some(slots) = responses.get_mut(&id) {
                slots[run_index] = text;
            }
            on_progress(RunProgress::CallFinished { succeeded });
        }

        let records = examples
            .examples
            .iter()
            .map(|(id, example)| {
                let record = RunRecord {
                    premise: example.premise.clone(),
                    statement: example.statement.clone(),
                    label: example.label,
                    responses: responses.remove(id).unwrap_or_default(),
                    extra: example.extra.clone(),
                };
                (id.clone(), record)
            })
            .collect();

        let output_path = output_dir.join(self.config.output_filename(file));
        ResultsFile { records }.save(&output_path).await?;
        on_progress(RunProgress::FileWritten {
            path: output_path.clone(),
        });
        Ok(output_path)
    }
}
