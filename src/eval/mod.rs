//! Evaluation harness (`spec.md` §4.H).

use std::io::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// One row of the evaluation dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    /// The question to ask.
    pub question: String,
    /// The expected (reference) answer.
    pub expected: String,
}

/// Per-row evaluation metrics and outputs. A row whose chat call failed
/// carries `error` and leaves the other fields at their defaults
/// (`spec.md` §7: "recorded per row as `{question, error}`; the batch
/// continues").
#[derive(Debug, Clone, Serialize)]
pub struct EvalRecord {
    /// The original question.
    pub question: String,
    /// The generated answer, empty if the row errored.
    pub answer: String,
    /// Whether an expected answer was provided.
    pub has_expected: bool,
    /// `1.0` if any expected-answer token of length > 3 appears
    /// case-insensitively in the answer, else `0.0`.
    pub answer_relevance: f32,
    /// Number of citations extracted from the answer.
    pub citations_count: usize,
    /// Set when the chat backend failed for this row; `answer`,
    /// `answer_relevance`, and `citations_count` are meaningless in that
    /// case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reads a JSONL dataset of `{question, expected}` rows.
pub fn read_dataset(path: &Path) -> Result<Vec<EvalCase>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RagError::io(format!("reading eval dataset {}", path.display()), e))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| RagError::EvalDatasetError {
                message: format!("invalid eval dataset row: {e}"),
            })
        })
        .collect()
}

/// Computes `answer_relevance` per `spec.md` §4.H: `1.0` if any
/// whitespace-split, case-insensitive token of `expected` longer than 3
/// characters appears in `answer`, else `0.0`.
#[must_use]
pub fn answer_relevance(answer: &str, expected: &str) -> f32 {
    let answer_lower = answer.to_lowercase();
    let has_match = expected
        .split_whitespace()
        .filter(|token| token.len() > 3)
        .any(|token| answer_lower.contains(&token.to_lowercase()));
    if has_match { 1.0 } else { 0.0 }
}

/// Builds one [`EvalRecord`] from a case and its generated answer.
#[must_use]
pub fn build_record(case: &EvalCase, answer: &str, citations_count: usize) -> EvalRecord {
    EvalRecord {
        question: case.question.clone(),
        answer: answer.to_string(),
        has_expected: !case.expected.trim().is_empty(),
        answer_relevance: answer_relevance(answer, &case.expected),
        citations_count,
        error: None,
    }
}

/// Builds an [`EvalRecord`] for a row whose chat call failed, recording
/// `{question, error}` per `spec.md` §7 while letting the batch continue.
#[must_use]
pub fn build_error_record(case: &EvalCase, error: &str) -> EvalRecord {
    EvalRecord {
        question: case.question.clone(),
        answer: String::new(),
        has_expected: !case.expected.trim().is_empty(),
        answer_relevance: 0.0,
        citations_count: 0,
        error: Some(error.to_string()),
    }
}

/// Writes `records` as a JSON array to `<index_dir>/eval_results.json`.
pub fn write_results(index_dir: &Path, records: &[EvalRecord]) -> Result<()> {
    let path = index_dir.join("eval_results.json");
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| RagError::json("serializing eval results", e))?;
    std::fs::write(&path, json)
        .map_err(|e| RagError::io(format!("writing eval results to {}", path.display()), e))
}

/// Replaces tabs and newlines in `field` with single spaces, for safe
/// embedding in a TSV cell.
#[must_use]
pub fn tsv_safe(field: &str) -> String {
    field
        .chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Appends one `query\tcontext\tanswer` row to the external-scorer TSV at
/// `path`, creating it (with no header) if absent.
pub fn append_tsv_row(path: &Path, query: &str, context: &str, answer: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RagError::io(format!("opening tsv output {}", path.display()), e))?;
    writeln!(
        file,
        "{}\t{}\t{}",
        tsv_safe(query),
        tsv_safe(context),
        tsv_safe(answer)
    )
    .map_err(|e| RagError::io(format!("writing tsv row to {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_is_one_when_long_token_matches() {
        assert_eq!(
            answer_relevance("Rust is a systems language", "A Systems language"),
            1.0
        );
    }

    #[test]
    fn relevance_is_zero_when_no_long_token_matches() {
        assert_eq!(answer_relevance("completely unrelated", "the cat sat"), 0.0);
    }

    #[test]
    fn relevance_ignores_tokens_of_length_three_or_less() {
        // "cat" has length 3, so it cannot contribute a match on its own.
        assert_eq!(answer_relevance("a cat sat", "cat"), 0.0);
    }

    #[test]
    fn tsv_safe_replaces_tabs_and_newlines() {
        assert_eq!(tsv_safe("a\tb\nc\rd"), "a b c d");
    }

    #[test]
    fn error_record_carries_question_and_error_with_no_answer() {
        let case = EvalCase {
            question: "q".to_string(),
            expected: "e".to_string(),
        };
        let record = build_error_record(&case, "chat backend unavailable: timeout");
        assert_eq!(record.question, "q");
        assert_eq!(record.error.as_deref(), Some("chat backend unavailable: timeout"));
        assert_eq!(record.answer, "");
        assert_eq!(record.citations_count, 0);
    }

    #[test]
    fn reads_jsonl_dataset_skipping_blank_lines() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("dataset.jsonl");
        std::fs::write(
            &path,
            "{\"question\": \"q1\", \"expected\": \"e1\"}\n\n{\"question\": \"q2\", \"expected\": \"e2\"}\n",
        )
        .unwrap_or_else(|_| unreachable!());
        let cases = read_dataset(&path).unwrap_or_else(|_| unreachable!());
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].question, "q1");
    }
}
