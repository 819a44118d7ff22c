//! Markdown ATX-heading pre-split.
//!
//! Per `spec.md` §4.A this lives in the Chunker (not the Loader, unlike the
//! original implementation it was distilled from). Markdown input is first
//! segmented by headings (`^#{1,6}\s+…$`); each segment carries
//! `section = heading text` and includes the heading line in its body.

use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t]*$").unwrap_or_else(|_| unreachable!()));

/// One markdown section: an optional heading (`None` for a leading preamble
/// with no heading above it) and the section body, heading line included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSection {
    /// Heading text, if this section starts at a heading.
    pub heading: Option<String>,
    /// Section body, including the heading line itself when present.
    pub body: String,
}

/// Splits `text` by ATX heading boundaries.
#[must_use]
pub fn split_by_headings(text: String) -> Vec<MarkdownSection> {
    let matches: Vec<_> = HEADING.find_iter(&text).collect();
    if matches.is_empty() {
        return vec![MarkdownSection {
            heading: None,
            body: text,
        }];
    }

    let mut sections = Vec::new();
    if matches[0].start() > 0 {
        let preamble = text[..matches[0].start()].trim();
        if !preamble.is_empty() {
            sections.push(MarkdownSection {
                heading: None,
                body: preamble.to_string(),
            });
        }
    }

    for (i, m) in matches.iter().enumerate() {
        let start = m.start();
        let end = matches.get(i + 1).map_or(text.len(), |n| n.start());
        let body = text[start..end].trim().to_string();
        let heading_text = HEADING
            .captures(&text[m.start()..m.end()])
            .and_then(|c| c.get(1))
            .map(|g| g.as_str().trim().to_string());
        sections.push(MarkdownSection {
            heading: heading_text,
            body,
        });
    }
    sections
}
