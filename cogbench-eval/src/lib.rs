//! # Cogbench Eval
//!
//! Scoring for cogbench experiment results: extracts categorical labels
//! from raw model responses, computes accuracy and macro-F1 per results
//! file, and renders reports as text tables, LaTeX rows, or JSON.
//!
//! ## Example
//!
//! ```no_run
//! use cogbench_core::TaskType;
//! use cogbench_eval::{Evaluator, Metric};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let evaluator = Evaluator::new("results", "data", TaskType::Nli);
//! let report = evaluator.evaluate().await?;
//! println!("{}", report.render_table(Metric::Accuracy));
//! # Ok(())
//! # }
//! ```

pub mod evaluator;
pub mod extract;
pub mod metrics;
pub mod report;

// Re-export public API
pub use evaluator::{EvalError, Evaluator};
pub use extract::{extract_label, Extraction};
pub use metrics::{ClassificationMetrics, LabelMetrics};
pub use report::{EvalReport, Metric, UnitFailure, UnitScores};
