//! Label extraction from raw model responses.
//!
//! Responses range from a bare label to paragraphs of reasoning ending in
//! "Output: entailment". Extraction narrows the response to an answer
//! region when a marker is present, then matches label surface forms as
//! whole words.

use cogbench_core::{Label, TaskType};

/// Markers that introduce the answer region of a response.
///
/// Matched case-insensitively; the last occurrence of any marker wins, so
/// reasoning that quotes the instruction ("I will end with Output: ...")
/// does not confuse extraction.
const ANSWER_MARKERS: [&str; 2] = ["output:", "final answer"];

/// Outcome of extracting a label from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// A single unambiguous label was found.
    Label(Label),
    /// No label, conflicting labels, or an error placeholder.
    Unparsable,
}

impl Extraction {
    pub fn label(&self) -> Option<Label> {
        match self {
            Extraction::Label(label) => Some(*label),
            Extraction::Unparsable => None,
        }
    }

    pub fn is_unparsable(&self) -> bool {
        matches!(self, Extraction::Unparsable)
    }
}

/// Extract the predicted label from a raw model response.
///
/// Rules, in order:
///
/// 1. Empty responses and recorded error placeholders (`ERROR: ...`) are
///    [`Extraction::Unparsable`].
/// 2. If an answer marker (`output:`, `final answer`) appears, only text
///    after its last occurrence is searched, and the last label mention
///    in that region wins.
/// 3. Without a marker, the whole response is searched; it parses only if
///    every label mention agrees. A response weighing two labels against
///    each other is ambiguous, not a prediction.
///
/// Surface forms match as whole words, so `incorrect` never matches its
/// `correct` substring.
pub fn extract_label(task: TaskType, response: &str) -> Extraction {
    let trimmed = response.trim();
    if trimmed.is_empty() || trimmed.starts_with("ERROR:") {
        return Extraction::Unparsable;
    }

    let haystack = trimmed.to_lowercase();
    let (region, in_region) = match answer_region(&haystack) {
        Some(region) => (region, true),
        None => (haystack.as_str(), false),
    };

    let mentions = find_mentions(task, region);
    if mentions.is_empty() {
        // A marker followed by no label (e.g. "Output: unsure") is still
        // unparsable; do not fall back to the reasoning text.
        return Extraction::Unparsable;
    }

    if in_region {
        // The marker already disambiguates; take the final mention.
        let (_, label) = mentions[mentions.len() - 1];
        return Extraction::Label(label);
    }

    let first = mentions[0].1;
    if mentions.iter().all(|&(_, label)| label == first) {
        Extraction::Label(first)
    } else {
        Extraction::Unparsable
    }
}

/// Text after the last answer marker, if any marker occurs.
fn answer_region(haystack: &str) -> Option<&str> {
    ANSWER_MARKERS
        .iter()
        .filter_map(|marker| haystack.rfind(marker).map(|pos| pos + marker.len()))
        .max()
        .map(|start| &haystack[start..])
}

/// All whole-word label mentions in `text`, in order of position.
fn find_mentions(task: TaskType, text: &str) -> Vec<(usize, Label)> {
    let mut mentions = Vec::new();
    for &(form, label) in task.surface_forms() {
        let mut offset = 0;
        while let Some(pos) = text[offset..].find(form) {
            let start = offset + pos;
            let end = start + form.len();
            if is_word_boundary(text, start, end) {
                mentions.push((start, label));
            }
            offset = start + 1;
        }
    }
    mentions.sort_unstable_by_key(|&(pos, _)| pos);
    mentions
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = start == 0
        || !text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
    let after_ok = end == text.len()
        || !text[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare_label("entailment", Some(Label::Entailment))]
    #[case::bare_uppercase("NEUTRAL", Some(Label::Neutral))]
    #[case::trailing_period("contradiction.", Some(Label::Contradiction))]
    #[case::in_sentence("I think it is neutral.", Some(Label::Neutral))]
    #[case::output_marker("Reasoning...\nOutput: entailment", Some(Label::Entailment))]
    #[case::final_answer_marker(
        "The final answer is entailment.",
        Some(Label::Entailment)
    )]
    #[case::marker_overrides_reasoning(
        "This looks like contradiction at first.\nOutput: neutral",
        Some(Label::Neutral)
    )]
    #[case::last_marker_wins(
        "Output: neutral\nWait, let me reconsider.\nOutput: contradiction",
        Some(Label::Contradiction)
    )]
    #[case::conflicting_no_marker("entailment or contradiction, hard to say", None)]
    #[case::repeated_agreeing("neutral... yes, neutral", Some(Label::Neutral))]
    #[case::marker_without_label("Output: unsure", None)]
    #[case::no_label("I cannot determine this.", None)]
    #[case::empty("", None)]
    #[case::whitespace("   \n  ", None)]
    #[case::error_placeholder("ERROR: request timed out", None)]
    fn test_extract_nli(#[case] response: &str, #[case] expected: Option<Label>) {
        assert_eq!(extract_label(TaskType::Nli, response).label(), expected);
    }

    #[rstest]
    #[case::bare_true("true", Some(Label::True))]
    #[case::bare_false("False.", Some(Label::False))]
    #[case::correct_alias("The statement is correct.", Some(Label::True))]
    #[case::incorrect_alias("incorrect", Some(Label::False))]
    #[case::incorrect_not_split("That would be incorrect.", Some(Label::False))]
    #[case::marker("Thinking it through...\nOutput: false", Some(Label::False))]
    #[case::agreeing_aliases("correct, the statement is true", Some(Label::True))]
    #[case::conflicting("true or false, unclear", None)]
    fn test_extract_factual(#[case] response: &str, #[case] expected: Option<Label>) {
        assert_eq!(extract_label(TaskType::Factual, response).label(), expected);
    }

    #[test]
    fn test_marker_region_last_label_wins() {
        let response = "Output: it could be entailment but on balance neutral";
        assert_eq!(
            extract_label(TaskType::Nli, response),
            Extraction::Label(Label::Neutral)
        );
    }

    #[test]
    fn test_whole_word_boundary() {
        // "entailments" is not a label mention
        assert_eq!(
            extract_label(TaskType::Nli, "several entailments exist"),
            Extraction::Unparsable
        );
        // "untrue" is not "true"
        assert_eq!(
            extract_label(TaskType::Factual, "that is untrue"),
            Extraction::Unparsable
        );
    }

    #[test]
    fn test_task_labels_do_not_cross() {
        // NLI extraction ignores factual vocabulary and vice versa.
        assert_eq!(
            extract_label(TaskType::Nli, "true"),
            Extraction::Unparsable
        );
        assert_eq!(
            extract_label(TaskType::Factual, "entailment"),
            Extraction::Unparsable
        );
    }
}
