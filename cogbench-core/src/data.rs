//! On-disk data formats: gold datasets and experiment results.
//!
//! Both formats are JSON objects keyed by example id. Records are read-only
//! once loaded.

use crate::task::Label;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors loading or writing data files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// A single gold example: premise, statement, and canonical label.
///
/// Input files may encode `premise` as either a string or an array of
/// strings (joined with single spaces on load), and `label` as either a
/// string or a JSON boolean. Unknown fields such as `reasoning_type` are
/// preserved and written back to results files unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    #[serde(deserialize_with = "string_or_seq")]
    pub premise: String,
    pub statement: String,
    #[serde(deserialize_with = "label_value")]
    pub label: Label,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A gold dataset file: example id -> [`Example`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleSet {
    pub examples: BTreeMap<String, Example>,
}

impl ExampleSet {
    /// Load a gold dataset from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, DataError> {
        let content = read_file(path).await?;
        serde_json::from_str(&content).map_err(|e| DataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Example> {
        self.examples.get(id)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// One example's collected responses in a results file.
///
/// `responses` holds one raw model response per repeated run, in run order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub premise: String,
    pub statement: String,
    #[serde(deserialize_with = "label_value")]
    pub label: Label,
    pub responses: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A results file: example id -> [`RunRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsFile {
    pub records: BTreeMap<String, RunRecord>,
}

impl ResultsFile {
    /// Load a results file from JSON.
    pub async fn load(path: &Path) -> Result<Self, DataError> {
        let content = read_file(path).await?;
        serde_json::from_str(&content).map_err(|e| DataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the results file as pretty-printed JSON.
    pub async fn save(&self, path: &Path) -> Result<(), DataError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, json).await.map_err(|e| DataError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

async fn read_file(path: &Path) -> Result<String, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).await.map_err(|e| DataError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Accept a premise encoded as a string or an array of strings.
fn string_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::One(s) => s.trim().to_string(),
        StringOrSeq::Many(parts) => parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    })
}

/// Accept a label encoded as a string or a JSON boolean.
fn label_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Label, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLabel {
        Bool(bool),
        Text(String),
    }

    match RawLabel::deserialize(deserializer)? {
        RawLabel::Bool(true) => Ok(Label::True),
        RawLabel::Bool(false) => Ok(Label::False),
        RawLabel::Text(s) => Label::from_canonical(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown label '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_premise_as_string() {
        let json = r#"{"premise": " The sky is blue. ", "statement": "It is blue.", "label": "entailment"}"#;
        let example: Example = serde_json::from_str(json).unwrap();
        assert_eq!(example.premise, "The sky is blue.");
        assert_eq!(example.label, Label::Entailment);
    }

    #[test]
    fn test_example_premise_as_list() {
        let json = r#"{"premise": ["Rain fell.", "The ground is wet."], "statement": "It rained.", "label": "entailment"}"#;
        let example: Example = serde_json::from_str(json).unwrap();
        assert_eq!(example.premise, "Rain fell. The ground is wet.");
    }

    #[test]
    fn test_example_boolean_label() {
        let json = r#"{"premise": "p", "statement": "s", "label": true}"#;
        let example: Example = serde_json::from_str(json).unwrap();
        assert_eq!(example.label, Label::True);

        let json = r#"{"premise": "p", "statement": "s", "label": false}"#;
        let example: Example = serde_json::from_str(json).unwrap();
        assert_eq!(example.label, Label::False);
    }

    #[test]
    fn test_example_unknown_label_rejected() {
        let json = r#"{"premise": "p", "statement": "s", "label": "perhaps"}"#;
        let result: Result<Example, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_fields_preserved() {
        let json = r#"{"premise": "p", "statement": "s", "label": "neutral", "reasoning_type": "causal"}"#;
        let example: Example = serde_json::from_str(json).unwrap();
        assert_eq!(
            example.extra.get("reasoning_type"),
            Some(&serde_json::json!("causal"))
        );

        let out = serde_json::to_value(&example).unwrap();
        assert_eq!(out["reasoning_type"], "causal");
    }

    #[tokio::test]
    async fn test_example_set_load() {
        let json = r#"{
            "1": {"premise": "p1", "statement": "s1", "label": "entailment"},
            "2": {"premise": "p2", "statement": "s2", "label": "contradiction"}
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();

        let set = ExampleSet::load(file.path()).await.unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("2").unwrap().label, Label::Contradiction);
        assert!(set.get("3").is_none());
    }

    #[tokio::test]
    async fn test_example_set_load_missing() {
        let result = ExampleSet::load(Path::new("/nonexistent/gold.json")).await;
        assert!(matches!(result, Err(DataError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_results_file_round_trip() {
        let mut records = BTreeMap::new();
        records.insert(
            "a".to_string(),
            RunRecord {
                premise: "p".into(),
                statement: "s".into(),
                label: Label::Entailment,
                responses: vec!["entailment".into(), "neutral".into()],
                extra: BTreeMap::new(),
            },
        );
        let results = ResultsFile { records };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("causal_res.json");
        results.save(&path).await.unwrap();

        let loaded = ResultsFile::load(&path).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records["a"].responses.len(), 2);
        assert_eq!(loaded.records["a"].label, Label::Entailment);
    }
}
