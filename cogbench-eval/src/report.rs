//! Evaluation report assembly and rendering.
//!
//! A report maps `model -> unit -> scores`, where a unit is one results
//! file (`{dataset}_{prompt_type}`). Rendering is plain text for the
//! terminal, LaTeX rows for papers, or JSON for downstream tooling.

use crate::metrics::ClassificationMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which score a rendered view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accuracy,
    F1,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::F1 => "macro-f1",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores for one evaluation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitScores {
    pub accuracy: f64,
    pub macro_f1: f64,
    /// Scored samples (one per recorded response)
    pub samples: usize,
    /// Samples with no extractable label
    pub unparsable: usize,
}

impl UnitScores {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::F1 => self.macro_f1,
        }
    }
}

impl From<&ClassificationMetrics> for UnitScores {
    fn from(metrics: &ClassificationMetrics) -> Self {
        Self {
            accuracy: metrics.accuracy,
            macro_f1: metrics.macro_f1,
            samples: metrics.total,
            unparsable: metrics.unparsable,
        }
    }
}

/// A unit that could not be scored, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub model: String,
    pub unit: String,
    pub reason: String,
}

/// Full evaluation output across all scored units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// model -> unit name -> scores
    pub units: BTreeMap<String, BTreeMap<String, UnitScores>>,
    /// Units skipped because of bad or mismatched inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
}

impl EvalReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: &str, unit: &str, scores: UnitScores) {
        self.units
            .entry(model.to_string())
            .or_default()
            .insert(unit.to_string(), scores);
    }

    pub fn record_failure(&mut self, model: &str, unit: &str, reason: String) {
        self.failures.push(UnitFailure {
            model: model.to_string(),
            unit: unit.to_string(),
            reason,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Plain-text table of one metric, model-major.
    pub fn render_table(&self, metric: Metric) -> String {
        let unit_width = self
            .units
            .values()
            .flat_map(|units| units.keys())
            .map(|unit| unit.len())
            .max()
            .unwrap_or(0)
            .max("unit".len());

        let mut out = String::new();
        for (model, units) in &self.units {
            out.push_str(&format!("=== {model} ({metric}) ===\n"));
            out.push_str(&format!(
                "{:<unit_width$}  {:>8}  {:>8}  {:>10}\n",
                "unit", "score", "samples", "unparsable"
            ));
            for (unit, scores) in units {
                out.push_str(&format!(
                    "{:<unit_width$}  {:>8.3}  {:>8}  {:>10}\n",
                    unit,
                    scores.value(metric),
                    scores.samples,
                    scores.unparsable
                ));
            }
            out.push('\n');
        }
        out
    }

    /// One LaTeX table row per unit: `model & unit & score \\`.
    pub fn render_latex(&self, metric: Metric) -> String {
        let mut out = String::new();
        for (model, units) in &self.units {
            for (unit, scores) in units {
                out.push_str(&format!(
                    "{} & {} & {:.3} \\\\\n",
                    model,
                    unit,
                    scores.value(metric)
                ));
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
