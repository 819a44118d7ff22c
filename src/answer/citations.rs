//! Citation extraction from model output (`spec.md` §4.G): three regex
//! passes, order preserved, duplicates kept.

use regex::Regex;

/// Extracts `[1]`, `[file: path]`, and `[url: ...]` citations from `text`,
/// in that pass order, preserving duplicates.
#[must_use]
pub fn parse_citations(text: &str) -> Vec<String> {
    let mut cited = Vec::new();

    if let Ok(numeric) = Regex::new(r"\[(\d+)\]") {
        for cap in numeric.captures_iter(text) {
            cited.push(cap[1].to_string());
        }
    }
    if let Ok(file) = Regex::new(r"(?i)\[file:\s*([^\]]+)\]") {
        for cap in file.captures_iter(text) {
            cited.push(format!("file:{}", cap[1].trim()));
        }
    }
    if let Ok(url) = Regex::new(r"(?i)\[url:\s*([^\]]+)\]") {
        for cap in url.captures_iter(text) {
            cited.push(format!("url:{}", cap[1].trim()));
        }
    }

    cited
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_three_citation_kinds_in_pass_order() {
        let text = "See [1] and [file: docs/a.md] plus [url: https://example.com] and [2].";
        assert_eq!(
            parse_citations(text),
            vec![
                "1".to_string(),
                "2".to_string(),
                "file:docs/a.md".to_string(),
                "url:https://example.com".to_string(),
            ]
        );
    }

    #[test]
    fn duplicates_are_preserved() {
        let text = "[1] again [1]";
        assert_eq!(parse_citations(text), vec!["1".to_string(), "1".to_string()]);
    }

    #[test]
    fn no_citations_returns_empty() {
        assert!(parse_citations("no citations here").is_empty());
    }
}
