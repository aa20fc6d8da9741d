//! Scores results directories against gold datasets.
//!
//! Results are laid out as `<results_dir>/<model>/<dataset>[_cot]_res.json`
//! with gold data at `<data_dir>/<dataset>.json`. Each results file is one
//! evaluation unit; a unit that fails to score is reported and skipped
//! rather than aborting the rest of the evaluation.

use crate::extract::extract_label;
use crate::metrics::ClassificationMetrics;
use crate::report::{EvalReport, UnitScores};
use cogbench_core::{DataError, ExampleSet, Label, PromptType, ResultsFile, TaskType};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors scoring an evaluation unit or walking the results tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Failed to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Results directory not found: {0}")]
    ResultsDirNotFound(PathBuf),

    #[error("Example '{example_id}' {detail}")]
    DataMismatch { example_id: String, detail: String },
}

/// One results file awaiting scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Unit {
    model: String,
    dataset: String,
    prompt_type: PromptType,
    path: PathBuf,
}

impl Unit {
    fn name(&self) -> String {
        format!("{}_{}", self.dataset, self.prompt_type)
    }
}

/// Scores all results files for a task against their gold datasets.
#[derive(Debug, Clone)]
pub struct Evaluator {
    results_dir: PathBuf,
    data_dir: PathBuf,
    task: TaskType,
    model_filter: Option<String>,
}

impl Evaluator {
    pub fn new(
        results_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        task: TaskType,
    ) -> Self {
        Self {
            results_dir: results_dir.into(),
            data_dir: data_dir.into(),
            task,
            model_filter: None,
        }
    }

    /// Restrict evaluation to a single model directory.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_filter = Some(model.into());
        self
    }

    /// Score every unit under the results directory.
    ///
    /// Units that cannot be scored (missing gold file, malformed JSON,
    /// gold/results disagreement) land in the report's failure list; only
    /// an unreadable results tree is a hard error.
    pub async fn evaluate(&self) -> Result<EvalReport, EvalError> {
        if !self.results_dir.is_dir() {
            return Err(EvalError::ResultsDirNotFound(self.results_dir.clone()));
        }

        let mut report = EvalReport::new();

        for unit in self.discover_units().await? {
            match self.evaluate_unit(&unit).await {
                Ok(metrics) => {
                    log::info!(
                        "Scored {}/{}: accuracy {:.3}, macro-f1 {:.3} ({} samples, {} unparsable)",
                        unit.model,
                        unit.name(),
                        metrics.accuracy,
                        metrics.macro_f1,
                        metrics.total,
                        metrics.unparsable
                    );
                    report.insert(&unit.model, &unit.name(), UnitScores::from(&metrics));
                }
                Err(e) => {
                    log::warn!("Skipping {}/{}: {}", unit.model, unit.name(), e);
                    report.record_failure(&unit.model, &unit.name(), e.to_string());
                }
            }
        }

        Ok(report)
    }

    async fn evaluate_unit(&self, unit: &Unit) -> Result<ClassificationMetrics, EvalError> {
        let results = ResultsFile::load(&unit.path).await?;
        let gold_path = self.data_dir.join(format!("{}.json", unit.dataset));
        let gold = ExampleSet::load(&gold_path).await?;

        let mut pairs = Vec::new();
        for (id, record) in &results.records {
            let example = gold.get(id).ok_or_else(|| EvalError::DataMismatch {
                example_id: id.clone(),
                detail: format!("is not in gold dataset {}", gold_path.display()),
            })?;
            if example.label != record.label {
                return Err(EvalError::DataMismatch {
                    example_id: id.clone(),
                    detail: format!(
                        "label '{}' in results disagrees with gold '{}'",
                        record.label, example.label
                    ),
                });
            }
            let gold_label: Label = example.label;
            for response in &record.responses {
                pairs.push((gold_label, extract_label(self.task, response)));
            }
        }

        Ok(ClassificationMetrics::compute(self.task, &pairs))
    }

    /// Find all results files, one subdirectory per model.
    async fn discover_units(&self) -> Result<Vec<Unit>, EvalError> {
        let mut units = Vec::new();
        let mut models = read_dir_sorted(&self.results_dir).await?;
        models.retain(|path| path.is_dir());

        for model_dir in models {
            let model = match model_dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            if let Some(filter) = &self.model_filter {
                if &model != filter {
                    continue;
                }
            }

            for path in read_dir_sorted(&model_dir).await? {
                let file_name = match path.file_name().and_then(|n| n.to_str()) {
                    Some(name) => name,
                    None => continue,
                };
                if let Some((dataset, prompt_type)) = parse_results_filename(file_name) {
                    units.push(Unit {
                        model: model.clone(),
                        dataset,
                        prompt_type,
                        path,
                    });
                }
            }
        }

        Ok(units)
    }
}

/// Split `<dataset>_res.json` / `<dataset>_cot_res.json` into its parts.
///
/// Returns `None` for files that do not follow the results naming
/// convention, so stray files in a model directory are ignored.
fn parse_results_filename(file_name: &str) -> Option<(String, PromptType)> {
    let stem = file_name.strip_suffix(".json")?;
    if let Some(dataset) = stem.strip_suffix("_cot_res") {
        if !dataset.is_empty() {
            return Some((dataset.to_string(), PromptType::Cot));
        }
    } else if let Some(dataset) = stem.strip_suffix("_res") {
        if !dataset.is_empty() {
            return Some((dataset.to_string(), PromptType::Direct));
        }
    }
    None
}

async fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, EvalError> {
    let io_err = |source| EvalError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(io_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}
