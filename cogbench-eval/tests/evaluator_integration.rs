//! Integration tests for the evaluator over on-disk fixtures.
//!
//! Builds small results/gold trees in a tempdir and checks scoring,
//! failure isolation, and report rendering end to end.

use cogbench_eval::{EvalReport, Evaluator, Metric};
use cogbench_core::TaskType;
use std::path::Path;
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    results_dir: std::path::PathBuf,
    data_dir: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let results_dir = root.path().join("results");
        let data_dir = root.path().join("data");
        std::fs::create_dir_all(&results_dir).unwrap();
        std::fs::create_dir_all(&data_dir).unwrap();
        Self {
            _root: root,
            results_dir,
            data_dir,
        }
    }

    fn write_gold(&self, dataset: &str, json: &str) {
        std::fs::write(self.data_dir.join(format!("{dataset}.json")), json).unwrap();
    }

    fn write_results(&self, model: &str, file_name: &str, json: &str) {
        let model_dir = self.results_dir.join(model);
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join(file_name), json).unwrap();
    }

    fn evaluator(&self, task: TaskType) -> Evaluator {
        Evaluator::new(&self.results_dir, &self.data_dir, task)
    }
}

const CAUSAL_GOLD: &str = r#"{
    "a": {"premise": "Rain fell all night.", "statement": "The ground is wet.", "label": "entailment"},
    "b": {"premise": "The shop is closed.", "statement": "The shop is open.", "label": "contradiction"}
}"#;

#[tokio::test]
async fn test_scores_mixed_unit() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    // One correct run each for "a"; "b" predicted entailment both times.
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{
            "a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                  "label": "entailment", "responses": ["entailment", "Output: entailment"]},
            "b": {"premise": "The shop is closed.", "statement": "The shop is open.",
                  "label": "contradiction", "responses": ["entailment", "I think entailment."]}
        }"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    assert!(!report.has_failures());

    let scores = &report.units["gpt-4o"]["causal_direct"];
    assert_eq!(scores.samples, 4);
    assert_eq!(scores.accuracy, 0.5);
    assert_eq!(scores.unparsable, 0);
    // entailment: p=0.5, r=1.0 -> f1 = 2/3; contradiction never predicted -> 0
    let expected_f1 = ((2.0 / 3.0) + 0.0) / 2.0;
    assert!((scores.macro_f1 - expected_f1).abs() < 1e-9);
}

#[tokio::test]
async fn test_direct_and_cot_are_separate_units() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "entailment", "responses": ["entailment"]}}"#,
    );
    fixture.write_results(
        "gpt-4o",
        "causal_cot_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "entailment", "responses": ["Step by step... Output: contradiction"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    let units = &report.units["gpt-4o"];
    assert_eq!(units.len(), 2);
    assert_eq!(units["causal_direct"].accuracy, 1.0);
    assert_eq!(units["causal_cot"].accuracy, 0.0);
}

#[tokio::test]
async fn test_label_mismatch_isolated_to_unit() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    // Results label for "a" disagrees with gold.
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "neutral", "responses": ["neutral"]}}"#,
    );
    // A healthy unit for another model still scores.
    fixture.write_results(
        "llama3.2",
        "causal_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "entailment", "responses": ["entailment"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].model, "gpt-4o");
    assert_eq!(report.failures[0].unit, "causal_direct");
    assert!(report.failures[0].reason.contains("disagrees with gold"));
    assert!(!report.units.contains_key("gpt-4o"));
    assert_eq!(report.units["llama3.2"]["causal_direct"].accuracy, 1.0);
}

#[tokio::test]
async fn test_unknown_example_id_is_failure() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{"zzz": {"premise": "p", "statement": "s", "label": "neutral", "responses": ["neutral"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.contains("not in gold dataset"));
}

#[tokio::test]
async fn test_missing_gold_file_is_failure() {
    let fixture = Fixture::new();
    fixture.write_results(
        "gpt-4o",
        "orphan_res.json",
        r#"{"a": {"premise": "p", "statement": "s", "label": "neutral", "responses": ["neutral"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    assert!(report.units.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].reason.contains("not found"));
}

#[tokio::test]
async fn test_model_filter() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    for model in ["gpt-4o", "llama3.2"] {
        fixture.write_results(
            model,
            "causal_res.json",
            r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                     "label": "entailment", "responses": ["entailment"]}}"#,
        );
    }

    let report = fixture
        .evaluator(TaskType::Nli)
        .with_model("llama3.2")
        .evaluate()
        .await
        .unwrap();
    assert_eq!(report.units.len(), 1);
    assert!(report.units.contains_key("llama3.2"));
}

#[tokio::test]
async fn test_non_results_files_ignored() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    fixture.write_results("gpt-4o", "notes.txt", "scratch");
    fixture.write_results("gpt-4o", "causal.json", "{}");
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "entailment", "responses": ["entailment"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    assert!(!report.has_failures());
    assert_eq!(report.units["gpt-4o"].len(), 1);
}

#[tokio::test]
async fn test_missing_results_dir_is_hard_error() {
    let evaluator = Evaluator::new(
        Path::new("/nonexistent/results"),
        Path::new("/nonexistent/data"),
        TaskType::Nli,
    );
    assert!(evaluator.evaluate().await.is_err());
}

#[tokio::test]
async fn test_report_round_trips_through_json() {
    let fixture = Fixture::new();
    fixture.write_gold("causal", CAUSAL_GOLD);
    fixture.write_results(
        "gpt-4o",
        "causal_res.json",
        r#"{"a": {"premise": "Rain fell all night.", "statement": "The ground is wet.",
                 "label": "entailment", "responses": ["entailment", "garbled"]}}"#,
    );

    let report = fixture.evaluator(TaskType::Nli).evaluate().await.unwrap();
    let json = report.to_json().unwrap();
    let parsed: EvalReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let latex = report.render_latex(Metric::Accuracy);
    assert!(latex.contains("gpt-4o & causal_direct & 0.500 \\\\"));
}
