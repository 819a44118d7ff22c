//! Indexer (`spec.md` §4.B): Loader → Chunker → Embedding backend →
//! Vector store → Manifest, with optional incremental reindexing.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::chunking::{self, ChunkStrategy};
use crate::embedding::EmbeddingBackend;
use crate::error::Result;
use crate::manifest::{self, Manifest};
use crate::vectorstore::{ChunkMetadata, MetadataFilter, VectorStore};

/// Options governing one indexing run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Chunking algorithm and parameters.
    pub strategy: ChunkStrategy,
    /// Embedding model name.
    pub embedding_model: String,
    /// Skip unchanged sources and delete-then-reinsert changed ones instead
    /// of recreating the whole collection.
    pub incremental: bool,
    /// Embed a file's chunks across a `rayon` thread pool instead of
    /// sequentially. Chunk ids are content-addressed and upsert order
    /// doesn't matter, so this changes only wall-clock time, not output.
    pub parallel: bool,
}

/// One indexed source path's outcome, for CLI reporting.
#[derive(Debug, Clone)]
pub struct IndexedSource {
    /// Absolute source path.
    pub path: String,
    /// Number of chunks produced.
    pub chunk_count: usize,
}

/// Indexes `paths` into `collection` of `store`, per `options`
/// (`spec.md` §4.B). A path that fails to canonicalize, hash, load, or
/// embed is skipped; the run continues with the remaining paths rather
/// than aborting.
pub fn index_paths(
    store: &dyn VectorStore,
    collection: &str,
    embedder: &dyn EmbeddingBackend,
    index_dir: &Path,
    paths: &[PathBuf],
    loader: &dyn crate::loader::Loader,
    options: &IndexOptions,
) -> Result<Vec<IndexedSource>> {
    let mut manifest = Manifest::load(index_dir)?;

    if options.incremental {
        store.get_or_create_collection(collection)?;
    } else {
        store.create_collection(collection)?;
    }

    let mut results = Vec::new();
    let mut newly_hashed: Vec<(String, String)> = Vec::new();

    for path in paths {
        let Ok(absolute) = path.canonicalize() else {
            continue;
        };
        let absolute_str = absolute.to_string_lossy().into_owned();

        let current_hash = match manifest::sha256_file(&absolute) {
            Ok(hash) => hash,
            Err(_) => continue,
        };

        if options.incremental && manifest.is_unchanged(&absolute_str, &current_hash) {
            continue;
        }

        let segments = match loader.load(&absolute) {
            Ok(segments) => segments,
            Err(_) => continue,
        };

        let mut chunks = Vec::new();
        for segment in &segments {
            chunks.extend(chunking::chunk_segment(segment, &options.strategy));
        }

        let embeddings: Vec<Result<Vec<f32>>> = if options.parallel {
            chunks
                .par_iter()
                .map(|chunk| embedder.embed(&options.embedding_model, &chunk.content))
                .collect()
        } else {
            chunks
                .iter()
                .map(|chunk| embedder.embed(&options.embedding_model, &chunk.content))
                .collect()
        };

        let mut tuples = Vec::new();
        let mut embedding_failed = false;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let Ok(embedding) = embedding else {
                embedding_failed = true;
                break;
            };
            let metadata = ChunkMetadata {
                source: chunk.source.clone(),
                file_type: chunk.file_type.clone(),
                chunk_id: chunk.ordinal,
                page: chunk.page,
                section: chunk.section.clone(),
            };
            tuples.push((chunk.id(), embedding, chunk.content.clone(), metadata));
        }
        if embedding_failed {
            continue;
        }

        if options.incremental {
            let filter = MetadataFilter::Equals {
                field: "source",
                value: absolute_str.clone(),
            };
            store.delete(collection, &filter)?;
        }
        store.add(collection, &tuples)?;

        results.push(IndexedSource {
            path: absolute_str.clone(),
            chunk_count: chunks.len(),
        });
        newly_hashed.push((absolute_str, current_hash));
    }

    for (path, hash) in newly_hashed {
        manifest.record(path, hash);
    }
    manifest.save(index_dir)?;

    Ok(results)
}
