//! Vector store contract (`spec.md` §3 "Collection", §6 "Vector store").

pub mod sqlite;

pub use sqlite::SqliteVectorStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata stored alongside each chunk's embedding and document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Absolute source path.
    pub source: String,
    /// Lowercased extension without dot, or `"document"`.
    pub file_type: String,
    /// 0-based ordinal within the owning document section.
    pub chunk_id: usize,
    /// 1-based page number, if applicable.
    pub page: Option<u32>,
    /// Section heading, if applicable.
    pub section: Option<String>,
}

/// A filter predicate over chunk metadata.
///
/// Models the original's free-form `{"field": value}` / `{"field": {"$regex": p}}`
/// filter grammar as a typed sum, per `spec.md` §9's explicit recommendation.
#[derive(Debug, Clone)]
pub enum MetadataFilter {
    /// No filter — every chunk matches.
    All,
    /// Exact equality on a metadata field.
    Equals {
        /// Field name: `"source"` or `"file_type"`.
        field: &'static str,
        /// Expected value.
        value: String,
    },
    /// Anchored-prefix regex match on a metadata field (`$regex`).
    Regex {
        /// Field name.
        field: &'static str,
        /// Compiled pattern.
        pattern: regex::Regex,
    },
    /// Conjunction of two predicates, for combining `--filter-source` and
    /// `--filter-type` in the same query.
    And(Box<MetadataFilter>, Box<MetadataFilter>),
}

impl MetadataFilter {
    /// Evaluates the predicate against one chunk's metadata.
    #[must_use]
    pub fn matches(&self, meta: &ChunkMetadata) -> bool {
        match self {
            Self::All => true,
            Self::Equals { field, value } => field_value(meta, field).is_some_and(|v| v == *value),
            Self::Regex { field, pattern } => {
                field_value(meta, field).is_some_and(|v| pattern.is_match(&v))
            }
            Self::And(a, b) => a.matches(meta) && b.matches(meta),
        }
    }
}

fn field_value(meta: &ChunkMetadata, field: &str) -> Option<String> {
    match field {
        "source" => Some(meta.source.clone()),
        "file_type" => Some(meta.file_type.clone()),
        _ => None,
    }
}

/// One row returned by `get`/`query`: id, document text, metadata.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    /// Content-addressed chunk id.
    pub id: String,
    /// Full chunk content (header + body).
    pub document: String,
    /// Stored metadata.
    pub metadata: ChunkMetadata,
}

/// A named vector collection configured for cosine similarity
/// (`spec.md` §3 "Collection").
pub trait VectorStore: Send + Sync {
    /// Creates `name`, replacing it if it already exists. Must set the
    /// distance metric to cosine.
    fn create_collection(&self, name: &str) -> Result<()>;

    /// Drops `name` entirely, if present.
    fn delete_collection(&self, name: &str) -> Result<()>;

    /// Creates `name` if absent; no-op (preserving contents) if present.
    fn get_or_create_collection(&self, name: &str) -> Result<()>;

    /// Returns all chunks in `name` matching `filter`.
    fn get(&self, name: &str, filter: &MetadataFilter) -> Result<Vec<StoredChunk>>;

    /// Returns the `n` chunks in `name` matching `filter` with embeddings
    /// closest (cosine similarity) to `embedding`, ordered by similarity
    /// descending.
    fn query(
        &self,
        name: &str,
        embedding: &[f32],
        n: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<StoredChunk>>;

    /// Inserts or updates chunks. Duplicate ids within one call must be
    /// tolerated — same content hashes to the same id, and the last write
    /// for a given id wins (`spec.md` §4.B).
    fn add(
        &self,
        name: &str,
        chunks: &[(String, Vec<f32>, String, ChunkMetadata)],
    ) -> Result<()>;

    /// Deletes all chunks in `name` matching `filter`.
    fn delete(&self, name: &str, filter: &MetadataFilter) -> Result<()>;

    /// Number of chunks currently stored in `name`.
    fn count(&self, name: &str) -> Result<usize>;
}

/// Cosine similarity between two equal-length embeddings; `0.0` if either
/// vector has zero magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
