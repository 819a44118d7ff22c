//! Human-readable formatting for CLI command results.
//!
//! Commands build a `String` with these helpers; the caller in
//! [`crate::main`] is the single place allowed to write it to stdout,
//! keeping `clippy::print_stdout` meaningful everywhere else.

use std::fmt::Write as _;

use crate::answer::AnswerResult;
use crate::eval::EvalRecord;
use crate::indexer::IndexedSource;

/// Formats the summary of an `index` run.
#[must_use]
pub fn format_index_summary(sources: &[IndexedSource]) -> String {
    if sources.is_empty() {
        return "No sources indexed (all unchanged or skipped).\n".to_string();
    }
    let mut out = String::new();
    for source in sources {
        let _ = writeln!(out, "{}: {} chunks", source.path, source.chunk_count);
    }
    let total: usize = sources.iter().map(|s| s.chunk_count).sum();
    let _ = writeln!(out, "Indexed {} file(s), {} chunk(s) total.", sources.len(), total);
    out
}

/// Formats an answer-orchestrator result for `query`/`research`.
#[must_use]
pub fn format_answer(result: &AnswerResult, show_citations: bool) -> String {
    let mut out = format!("{}\n", result.answer.trim());
    if show_citations {
        if result.citations.is_empty() {
            out.push_str("\nCitations: none\n");
        } else {
            let _ = writeln!(out, "\nCitations: {}", result.citations.join(", "));
        }
    }
    out
}

/// Formats the assembled context for `--context-only` queries.
#[must_use]
pub fn format_context_only(context: &str) -> String {
    if context.is_empty() {
        "No context retrieved.\n".to_string()
    } else {
        format!("{context}\n")
    }
}

/// Formats an evaluation run's summary.
#[must_use]
pub fn format_eval_summary(records: &[EvalRecord]) -> String {
    if records.is_empty() {
        return "No rows evaluated.\n".to_string();
    }
    let relevant = records.iter().filter(|r| r.answer_relevance > 0.0).count();
    let total_citations: usize = records.iter().map(|r| r.citations_count).sum();
    let mut out = String::new();
    let _ = writeln!(out, "Evaluated {} row(s).", records.len());
    let _ = writeln!(
        out,
        "Relevant answers: {relevant}/{} ({:.1}%)",
        records.len(),
        100.0 * relevant as f32 / records.len() as f32
    );
    let _ = writeln!(out, "Total citations: {total_citations}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_summary_says_so() {
        assert_eq!(
            format_index_summary(&[]),
            "No sources indexed (all unchanged or skipped).\n"
        );
    }

    #[test]
    fn answer_without_citations_flag_omits_citation_line() {
        let result = AnswerResult {
            answer: "hello".to_string(),
            citations: vec!["1".to_string()],
            cached: false,
        };
        assert_eq!(format_answer(&result, false), "hello\n");
    }

    #[test]
    fn answer_with_citations_flag_lists_them() {
        let result = AnswerResult {
            answer: "hello".to_string(),
            citations: vec!["1".to_string(), "file:a.md".to_string()],
            cached: false,
        };
        assert!(format_answer(&result, true).contains("Citations: 1, file:a.md"));
    }

    #[test]
    fn eval_summary_computes_relevance_percentage() {
        let records = vec![
            EvalRecord {
                question: "q1".to_string(),
                answer: "a1".to_string(),
                has_expected: true,
                answer_relevance: 1.0,
                citations_count: 2,
                error: None,
            },
            EvalRecord {
                question: "q2".to_string(),
                answer: "a2".to_string(),
                has_expected: true,
                answer_relevance: 0.0,
                citations_count: 0,
                error: None,
            },
        ];
        let summary = format_eval_summary(&records);
        assert!(summary.contains("Relevant answers: 1/2 (50.0%)"));
        assert!(summary.contains("Total citations: 2"));
    }
}
