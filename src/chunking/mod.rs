//! Chunker (`spec.md` §4.A): splits loaded document text into overlapping,
//! header-tagged passages.

pub mod header;
pub mod markdown;
pub mod recursive;
pub mod semantic;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use header::{ChunkMeta, with_header};

/// A single `(text, metadata)` pair as yielded by the Loader (`spec.md` §6).
#[derive(Debug, Clone)]
pub struct DocumentSegment {
    /// Extracted text for this segment (one PDF page, one Markdown section,
    /// one Word document, or the whole of a plain-text file).
    pub text: String,
    /// Absolute source path.
    pub source: String,
    /// Lowercased extension without dot, or `"document"`.
    pub file_type: String,
    /// 1-based page number, if applicable.
    pub page: Option<u32>,
    /// Section heading, if the Loader already knows one.
    pub section: Option<String>,
}

/// Which splitting algorithm to run, and its parameters.
#[derive(Debug, Clone)]
pub enum ChunkStrategy {
    /// Recursive character/token splitter.
    Recursive {
        /// Size budget (chars, or tokens when `use_tokens`).
        chunk_size: usize,
        /// Overlap (chars, or tokens when `use_tokens`).
        overlap: usize,
        /// Measure size in approximate tokens instead of characters.
        use_tokens: bool,
    },
    /// Paragraph-boundary splitter.
    Semantic {
        /// Token budget per chunk.
        chunk_size_tokens: usize,
        /// Fraction of `chunk_size_tokens` carried forward as overlap.
        overlap_ratio: f32,
    },
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::Recursive {
            chunk_size: 1000,
            overlap: 200,
            use_tokens: false,
        }
    }
}

/// A passage emitted by the Chunker (`spec.md` §3 "Chunk").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Tag header + `---` separator + body.
    pub content: String,
    /// Absolute source path.
    pub source: String,
    /// Lowercased extension without dot, or `"document"`.
    pub file_type: String,
    /// 0-based ordinal within the owning document section.
    pub ordinal: usize,
    /// 1-based page number, if applicable.
    pub page: Option<u32>,
    /// First non-empty heading text for this chunk's section, if any.
    pub section: Option<String>,
}

impl Chunk {
    /// Content-addressed chunk id: first 12 hex characters of the MD5 of
    /// `content` (tag header included). Identical content collides on
    /// purpose — duplicates de-duplicate on upsert (`spec.md` §3, §9).
    #[must_use]
    pub fn id(&self) -> String {
        let digest = Md5::digest(self.content.as_bytes());
        hex::encode(digest)[..12].to_string()
    }
}

/// Runs the Chunker over one Loader segment, producing tagged [`Chunk`]s.
///
/// Markdown segments are first pre-split by ATX heading (`spec.md` §4.A);
/// each resulting sub-section resets its own ordinal counter, since a
/// chunk's ordinal is scoped to "the owning document section".
#[must_use]
pub fn chunk_segment(segment: &DocumentSegment, strategy: &ChunkStrategy) -> Vec<Chunk> {
    let is_markdown = matches!(segment.file_type.as_str(), "md" | "markdown");
    if is_markdown {
        markdown::split_by_headings(segment.text.clone())
            .into_iter()
            .flat_map(|section| {
                let section_name = section.heading.or_else(|| segment.section.clone());
                chunk_body(
                    &section.body,
                    &segment.source,
                    &segment.file_type,
                    segment.page,
                    section_name.as_deref(),
                    strategy,
                )
            })
            .collect()
    } else {
        chunk_body(
            &segment.text,
            &segment.source,
            &segment.file_type,
            segment.page,
            segment.section.as_deref(),
            strategy,
        )
    }
}

fn chunk_body(
    body: &str,
    source: &str,
    file_type: &str,
    page: Option<u32>,
    section: Option<&str>,
    strategy: &ChunkStrategy,
) -> Vec<Chunk> {
    let pieces = match strategy {
        ChunkStrategy::Recursive {
            chunk_size,
            overlap,
            use_tokens,
        } => {
            if *use_tokens {
                recursive::split_tokens(body, *chunk_size, *overlap)
            } else {
                recursive::split_chars(body, *chunk_size, *overlap)
            }
        }
        ChunkStrategy::Semantic {
            chunk_size_tokens,
            overlap_ratio,
        } => semantic::split_semantic(body, *chunk_size_tokens, *overlap_ratio),
    };

    pieces
        .into_iter()
        .enumerate()
        .map(|(ordinal, piece)| {
            let meta = ChunkMeta {
                source,
                file_type,
                page,
                section,
            };
            Chunk {
                content: with_header(&meta, &piece),
                source: source.to_string(),
                file_type: file_type.to_string(),
                ordinal,
                page,
                section: section.map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> DocumentSegment {
        DocumentSegment {
            text: text.to_string(),
            source: "/docs/a.txt".to_string(),
            file_type: "txt".to_string(),
            page: None,
            section: None,
        }
    }

    #[test]
    fn empty_segment_yields_zero_chunks() {
        let strategy = ChunkStrategy::Recursive {
            chunk_size: 20,
            overlap: 4,
            use_tokens: false,
        };
        assert!(chunk_segment(&segment(""), &strategy).is_empty());
        assert!(chunk_segment(&segment("   "), &strategy).is_empty());
    }

    #[test]
    fn chunk_content_has_header_then_separator_then_body() {
        let strategy = ChunkStrategy::Recursive {
            chunk_size: 20,
            overlap: 4,
            use_tokens: false,
        };
        let chunks = chunk_segment(&segment("aaaa. bbbb. cccc. dddd."), &strategy);
        assert_eq!(chunks.len(), 2);
        for c in &chunks {
            let mut parts = c.content.splitn(2, "\n---\n");
            let header = parts.next().unwrap_or_default();
            let body = parts.next().unwrap_or_default();
            assert!(header.starts_with("[file: /docs/a.txt] [type: txt] [source: a.txt]"));
            assert!(!body.trim().is_empty());
        }
        assert!(chunks[0].content.ends_with("aaaa. bbbb. cccc."));
        assert!(chunks[1].content.ends_with("dddd."));
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[1].ordinal, 1);
    }

    #[test]
    fn identical_content_produces_identical_ids() {
        let strategy = ChunkStrategy::Recursive {
            chunk_size: 100,
            overlap: 0,
            use_tokens: false,
        };
        let a = chunk_segment(&segment("same text"), &strategy);
        let b = chunk_segment(&segment("same text"), &strategy);
        assert_eq!(a[0].id(), b[0].id());
        assert_eq!(a[0].id().len(), 12);
    }

    #[test]
    fn different_sources_never_collide_even_with_same_body() {
        let strategy = ChunkStrategy::Recursive {
            chunk_size: 100,
            overlap: 0,
            use_tokens: false,
        };
        let mut seg_a = segment("same text");
        let mut seg_b = segment("same text");
        seg_b.source = "/docs/b.txt".to_string();
        let a = chunk_segment(&seg_a, &strategy);
        let b = chunk_segment(&seg_b, &strategy);
        assert_ne!(a[0].id(), b[0].id());
        seg_a.text.clear();
        assert!(seg_a.text.is_empty());
    }

    #[test]
    fn markdown_segments_reset_ordinal_per_heading_section() {
        let strategy = ChunkStrategy::Recursive {
            chunk_size: 1000,
            overlap: 0,
            use_tokens: false,
        };
        let mut seg = segment("# One\nfirst body\n\n# Two\nsecond body\n");
        seg.file_type = "md".to_string();
        let chunks = chunk_segment(&seg, &strategy);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[1].ordinal, 0);
        assert_eq!(chunks[0].section.as_deref(), Some("One"));
        assert_eq!(chunks[1].section.as_deref(), Some("Two"));
    }
}
