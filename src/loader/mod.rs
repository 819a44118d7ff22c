//! Loader contract (`spec.md` §6): reads a source path into ordered
//! `(text, metadata)` segments. PDF/Office parsing is explicitly out of
//! scope (`spec.md` §1) — this crate ships a plain-text/Markdown reference
//! implementation and fails unsupported extensions with `FormatUnsupported`.

use std::path::Path;

use crate::chunking::DocumentSegment;
use crate::error::{RagError, Result};

/// Reads a source file into one or more segments.
pub trait Loader: Send + Sync {
    /// Loads `path`, returning one segment per page/section/document as
    /// appropriate for the format. Empty strings are filtered before
    /// chunking (`spec.md` §6).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::FormatUnsupported`] for unrecognized extensions,
    /// or [`RagError::SourceMissing`] if `path` cannot be read.
    fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>>;
}

/// Reference loader: plain text and Markdown files, one segment per file.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextLoader;

fn file_type_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "document".to_string())
}

impl Loader for PlainTextLoader {
    fn load(&self, path: &Path) -> Result<Vec<DocumentSegment>> {
        let file_type = file_type_of(path);
        if !matches!(file_type.as_str(), "txt" | "md" | "markdown") {
            return Err(RagError::FormatUnsupported {
                message: format!("no loader registered for .{file_type} files"),
            });
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::SourceMissing {
                message: format!("{}: {e}", path.display()),
            })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![DocumentSegment {
            text,
            source: path.to_string_lossy().into_owned(),
            file_type,
            page: None,
            section: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_plain_text_file_as_single_segment() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello world").unwrap_or_else(|_| unreachable!());
        let segments = PlainTextLoader.load(&path).unwrap_or_else(|_| unreachable!());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].file_type, "txt");
        assert_eq!(segments[0].text, "hello world");
    }

    #[test]
    fn empty_file_yields_no_segments() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "   \n\t").unwrap_or_else(|_| unreachable!());
        let segments = PlainTextLoader.load(&path).unwrap_or_else(|_| unreachable!());
        assert!(segments.is_empty());
    }

    #[test]
    fn unsupported_extension_fails_with_format_error() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap_or_else(|_| unreachable!());
        let err = PlainTextLoader.load(&path).unwrap_err();
        assert!(matches!(err, RagError::FormatUnsupported { .. }));
    }

    #[test]
    fn missing_file_fails_with_source_missing() {
        let err = PlainTextLoader
            .load(Path::new("/nonexistent/path/x.txt"))
            .unwrap_err();
        assert!(matches!(err, RagError::SourceMissing { .. }));
    }
}
