//! Task and label model.
//!
//! Both experiment tasks classify a `(premise, statement)` pair into a
//! closed label set: three-way inference labels for NLI, a true/false pair
//! for factual correctness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for parsing closed-set identifiers from user input.
#[derive(Debug, Error)]
#[error("Unknown {kind} '{value}'. Valid values: {valid}")]
pub struct ParseEnumError {
    /// What was being parsed ("task type", "label", ...)
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
    /// Comma-separated valid values
    pub valid: &'static str,
}

/// The experiment task being run or evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Natural language inference: entailment / neutral / contradiction
    Nli,
    /// Factual correctness: true / false
    Factual,
}

impl TaskType {
    /// The canonical label set for this task.
    pub fn labels(&self) -> &'static [Label] {
        match self {
            TaskType::Nli => &[Label::Entailment, Label::Neutral, Label::Contradiction],
            TaskType::Factual => &[Label::True, Label::False],
        }
    }

    /// Surface forms a model response may use for each label of this task.
    ///
    /// For the factual task this includes `correct`/`incorrect`, which
    /// normalize to the canonical true/false pair.
    pub fn surface_forms(&self) -> &'static [(&'static str, Label)] {
        match self {
            TaskType::Nli => &[
                ("entailment", Label::Entailment),
                ("neutral", Label::Neutral),
                ("contradiction", Label::Contradiction),
            ],
            TaskType::Factual => &[
                ("true", Label::True),
                ("false", Label::False),
                ("correct", Label::True),
                ("incorrect", Label::False),
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Nli => "nli",
            TaskType::Factual => "factual",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nli" => Ok(TaskType::Nli),
            "factual" => Ok(TaskType::Factual),
            _ => Err(ParseEnumError {
                kind: "task type",
                value: s.to_string(),
                valid: "nli, factual",
            }),
        }
    }
}

/// Prompting strategy used for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptType {
    /// Ask for the label directly
    Direct,
    /// Chain-of-thought: elicit reasoning before the final label
    Cot,
}

impl PromptType {
    /// Filename of the prompt template for this strategy.
    pub fn template_filename(&self) -> &'static str {
        match self {
            PromptType::Direct => "direct.txt",
            PromptType::Cot => "cot.txt",
        }
    }

    /// Results-file suffix (before `.json`) for this strategy.
    pub fn results_suffix(&self) -> &'static str {
        match self {
            PromptType::Direct => "res",
            PromptType::Cot => "cot_res",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Direct => "direct",
            PromptType::Cot => "cot",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(PromptType::Direct),
            "cot" => Ok(PromptType::Cot),
            _ => Err(ParseEnumError {
                kind: "prompt type",
                value: s.to_string(),
                valid: "direct, cot",
            }),
        }
    }
}

/// A canonical classification label.
///
/// The full set spans both tasks; [`TaskType::labels`] gives the subset
/// valid for a given task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Entailment,
    Neutral,
    Contradiction,
    True,
    False,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Entailment => "entailment",
            Label::Neutral => "neutral",
            Label::Contradiction => "contradiction",
            Label::True => "true",
            Label::False => "false",
        }
    }

    /// Parse a canonical gold-label string (case-insensitive, trimmed).
    ///
    /// Accepts the common surface variants `correct`/`incorrect` as
    /// aliases for true/false, since some gold files use them.
    pub fn from_canonical(s: &str) -> Option<Label> {
        match s.trim().to_lowercase().as_str() {
            "entailment" => Some(Label::Entailment),
            "neutral" => Some(Label::Neutral),
            "contradiction" => Some(Label::Contradiction),
            "true" | "correct" => Some(Label::True),
            "false" | "incorrect" => Some(Label::False),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_task_label_sets() {
        assert_eq!(TaskType::Nli.labels().len(), 3);
        assert_eq!(TaskType::Factual.labels(), &[Label::True, Label::False]);
    }

    #[rstest]
    #[case("nli", TaskType::Nli)]
    #[case("NLI", TaskType::Nli)]
    #[case(" factual ", TaskType::Factual)]
    fn test_task_from_str(#[case] input: &str, #[case] expected: TaskType) {
        assert_eq!(input.parse::<TaskType>().unwrap(), expected);
    }

    #[test]
    fn test_task_from_str_invalid() {
        let err = "qa".parse::<TaskType>().unwrap_err();
        assert!(err.to_string().contains("qa"));
        assert!(err.to_string().contains("nli"));
    }

    #[test]
    fn test_prompt_type_conventions() {
        assert_eq!(PromptType::Direct.results_suffix(), "res");
        assert_eq!(PromptType::Cot.results_suffix(), "cot_res");
        assert_eq!(PromptType::Cot.template_filename(), "cot.txt");
    }

    #[rstest]
    #[case("entailment", Some(Label::Entailment))]
    #[case("  Neutral ", Some(Label::Neutral))]
    #[case("CONTRADICTION", Some(Label::Contradiction))]
    #[case("True", Some(Label::True))]
    #[case("correct", Some(Label::True))]
    #[case("incorrect", Some(Label::False))]
    #[case("maybe", None)]
    #[case("", None)]
    fn test_label_from_canonical(#[case] input: &str, #[case] expected: Option<Label>) {
        assert_eq!(Label::from_canonical(input), expected);
    }

    #[test]
    fn test_label_serde_lowercase() {
        let json = serde_json::to_string(&Label::Entailment).unwrap();
        assert_eq!(json, "\"entailment\"");
        let label: Label = serde_json::from_str("\"false\"").unwrap();
        assert_eq!(label, Label::False);
    }

    #[test]
    fn test_factual_surface_forms_normalize() {
        let forms = TaskType::Factual.surface_forms();
        assert!(forms.contains(&("correct", Label::True)));
        assert!(forms.contains(&("incorrect", Label::False)));
    }
}
