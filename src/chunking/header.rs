//! Chunk tag header construction.

use std::path::Path;

/// Metadata carried by every chunk, used to build its tag header.
#[derive(Debug, Clone)]
pub struct ChunkMeta<'a> {
    /// Absolute source path.
    pub source: &'a str,
    /// Lowercased extension without dot, or `"document"`.
    pub file_type: &'a str,
    /// 1-based page number, if applicable.
    pub page: Option<u32>,
    /// Section heading text, if applicable.
    pub section: Option<&'a str>,
}

/// Builds the one-line tag header: `[file:…] [type:…] [source: basename]`
/// followed by optional `[page:…]` and `[section:…]`, in that fixed order.
#[must_use]
pub fn build_header(meta: &ChunkMeta<'_>) -> String {
    let basename = Path::new(meta.source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| meta.source.to_string());

    let mut header = format!(
        "[file: {}] [type: {}] [source: {}]",
        meta.source, meta.file_type, basename
    );
    if let Some(page) = meta.page {
        header.push_str(&format!(" [page: {page}]"));
    }
    if let Some(section) = meta.section {
        header.push_str(&format!(" [section: {section}]"));
    }
    header
}

/// Prepends `header + "\n---\n"` to `body`.
#[must_use]
pub fn with_header(meta: &ChunkMeta<'_>, body: &str) -> String {
    format!("{}\n---\n{}", build_header(meta), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_includes_fixed_fields_in_order() {
        let meta = ChunkMeta {
            source: "/docs/a/report.md",
            file_type: "md",
            page: None,
            section: None,
        };
        assert_eq!(
            build_header(&meta),
            "[file: /docs/a/report.md] [type: md] [source: report.md]"
        );
    }

    #[test]
    fn header_appends_page_then_section() {
        let meta = ChunkMeta {
            source: "/docs/a/report.pdf",
            file_type: "pdf",
            page: Some(3),
            section: Some("Intro"),
        };
        assert_eq!(
            build_header(&meta),
            "[file: /docs/a/report.pdf] [type: pdf] [source: report.pdf] [page: 3] [section: Intro]"
        );
    }

    #[test]
    fn with_header_separates_header_and_body_with_dashes() {
        let meta = ChunkMeta {
            source: "/x.txt",
            file_type: "txt",
            page: None,
            section: None,
        };
        let out = with_header(&meta, "body text");
        assert_eq!(
            out,
            "[file: /x.txt] [type: txt] [source: x.txt]\n---\nbody text"
        );
    }
}
