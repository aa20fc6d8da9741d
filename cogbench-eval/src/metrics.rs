//! Classification metrics over (gold, predicted) pairs.
//!
//! Every recorded run of every example is one sample; unparsable
//! responses stay in the denominator and count as wrong.

use crate::extract::Extraction;
use cogbench_core::{Label, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-label precision/recall/F1 counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Gold occurrences of this label
    pub support: usize,
    /// Predicted occurrences of this label
    pub predicted: usize,
}

/// Aggregate metrics for one evaluation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub macro_f1: f64,
    /// Samples where the extracted label matched gold
    pub correct: usize,
    /// Total samples scored (one per response)
    pub total: usize,
    /// Samples with no extractable label
    pub unparsable: usize,
    pub per_label: BTreeMap<Label, LabelMetrics>,
}

impl ClassificationMetrics {
    /// Compute metrics from `(gold, extracted)` pairs.
    ///
    /// Macro-F1 averages per-label F1 over the task's label set, skipping
    /// labels that appear in neither gold nor predictions. A label that
    /// appears on only one side contributes its (zero) F1, so a model
    /// that never predicts `contradiction` is penalized for it.
    pub fn compute(task: TaskType, pairs: &[(Label, Extraction)]) -> Self {
        let total = pairs.len();
        let correct = pairs
            .iter()
            .filter(|(gold, extraction)| extraction.label() == Some(*gold))
            .count();
        let unparsable = pairs
            .iter()
            .filter(|(_, extraction)| extraction.is_unparsable())
            .count();

        let mut per_label = BTreeMap::new();
        let mut f1_sum = 0.0;
        let mut f1_count = 0usize;

        for &label in task.labels() {
            let support = pairs.iter().filter(|(gold, _)| *gold == label).count();
            let predicted = pairs
                .iter()
                .filter(|(_, extraction)| extraction.label() == Some(label))
                .count();
            let true_positives = pairs
                .iter()
                .filter(|(gold, extraction)| {
                    *gold == label && extraction.label() == Some(label)
                })
                .count();

            if support == 0 && predicted == 0 {
                continue;
            }

            let precision = ratio(true_positives, predicted);
            let recall = ratio(true_positives, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_label.insert(
                label,
                LabelMetrics {
                    precision,
                    recall,
                    f1,
                    support,
                    predicted,
                },
            );
            f1_sum += f1;
            f1_count += 1;
        }

        Self {
            accuracy: ratio(correct, total),
            macro_f1: if f1_count > 0 {
                f1_sum / f1_count as f64
            } else {
                0.0
            },
            correct,
            total,
            unparsable,
            per_label,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
