//! SQLite-backed [`VectorStore`] reference implementation.
//!
//! Embeddings are stored as little-endian `f32` BLOBs; cosine similarity is
//! computed in-process at query time (`spec.md` leaves the vector store's
//! internals external — this is one concrete, persistence-only backend).
//! Grounded on the teacher's `rusqlite` dependency and `bundled`/
//! `modern_sqlite` feature choice.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;

use super::{ChunkMetadata, MetadataFilter, StoredChunk, VectorStore, cosine_similarity};
use crate::error::{RagError, Result};

/// A `rusqlite`-backed vector store persisted at `<index_dir>/vectors.sqlite3`.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

fn to_sql_err(context: &str, err: rusqlite::Error) -> RagError {
    RagError::VectorStoreError {
        message: format!("{context}: {err}"),
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl SqliteVectorStore {
    /// Opens (creating if needed) the store at `<index_dir>/vectors.sqlite3`.
    pub fn open(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)
            .map_err(|e| RagError::io(format!("creating {}", index_dir.display()), e))?;
        let db_path: PathBuf = index_dir.join("vectors.sqlite3");
        let conn = Connection::open(&db_path).map_err(|e| to_sql_err("opening database", e))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chunks (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                document TEXT NOT NULL,
                embedding BLOB NOT NULL,
                source TEXT NOT NULL,
                file_type TEXT NOT NULL,
                chunk_id INTEGER NOT NULL,
                page INTEGER,
                section TEXT,
                PRIMARY KEY (collection, id)
            );",
        )
        .map_err(|e| to_sql_err("creating schema", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RagError::VectorStoreError {
                message: "vector store connection lock poisoned".to_string(),
            })
    }
}

impl VectorStore for SqliteVectorStore {
    fn create_collection(&self, name: &str) -> Result<()> {
        self.delete_collection(name)
    }

    fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM chunks WHERE collection = ?1", [name])
            .map_err(|e| to_sql_err("deleting collection", e))?;
        Ok(())
    }

    fn get_or_create_collection(&self, _name: &str) -> Result<()> {
        // The schema is shared across all collections and rows are created
        // lazily by `add`; nothing to provision up front.
        Ok(())
    }

    fn get(&self, name: &str, filter: &MetadataFilter) -> Result<Vec<StoredChunk>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, document, source, file_type, chunk_id, page, section
                 FROM chunks WHERE collection = ?1",
            )
            .map_err(|e| to_sql_err("preparing get", e))?;
        let rows = stmt
            .query_map([name], row_to_stored_chunk)
            .map_err(|e| to_sql_err("querying get", e))?;
        let mut out = Vec::new();
        for row in rows {
            let chunk = row.map_err(|e| to_sql_err("reading row", e))?;
            if filter.matches(&chunk.metadata) {
                out.push(chunk);
            }
        }
        Ok(out)
    }

    fn query(
        &self,
        name: &str,
        embedding: &[f32],
        n: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<StoredChunk>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, document, source, file_type, chunk_id, page, section, embedding
                 FROM chunks WHERE collection = ?1",
            )
            .map_err(|e| to_sql_err("preparing query", e))?;
        let rows = stmt
            .query_map([name], |row| {
                let chunk = row_to_stored_chunk(row)?;
                let blob: Vec<u8> = row.get(7)?;
                Ok((chunk, blob))
            })
            .map_err(|e| to_sql_err("querying", e))?;

        let mut scored = Vec::new();
        for row in rows {
            let (chunk, blob) = row.map_err(|e| to_sql_err("reading row", e))?;
            if !filter.matches(&chunk.metadata) {
                continue;
            }
            let score = cosine_similarity(embedding, &blob_to_embedding(&blob));
            scored.push((score, chunk));
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(n).map(|(_, c)| c).collect())
    }

    fn add(&self, name: &str, chunks: &[(String, Vec<f32>, String, ChunkMetadata)]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| to_sql_err("starting transaction", e))?;
        for (id, embedding, document, meta) in chunks {
            tx.execute(
                "INSERT INTO chunks
                    (collection, id, document, embedding, source, file_type, chunk_id, page, section)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    embedding = excluded.embedding,
                    source = excluded.source,
                    file_type = excluded.file_type,
                    chunk_id = excluded.chunk_id,
                    page = excluded.page,
                    section = excluded.section",
                rusqlite::params![
                    name,
                    id,
                    document,
                    embedding_to_blob(embedding),
                    meta.source,
                    meta.file_type,
                    meta.chunk_id as i64,
                    meta.page.map(i64::from),
                    meta.section,
                ],
            )
            .map_err(|e| to_sql_err("upserting chunk", e))?;
        }
        tx.commit().map_err(|e| to_sql_err("committing transaction", e))?;
        Ok(())
    }

    fn delete(&self, name: &str, filter: &MetadataFilter) -> Result<()> {
        match filter {
            MetadataFilter::All => {
                let conn = self.lock()?;
                conn.execute("DELETE FROM chunks WHERE collection = ?1", [name])
                    .map_err(|e| to_sql_err("deleting all", e))?;
                Ok(())
            }
            MetadataFilter::Equals {
                field: "source",
                value,
            } => {
                let conn = self.lock()?;
                conn.execute(
                    "DELETE FROM chunks WHERE collection = ?1 AND source = ?2",
                    rusqlite::params![name, value],
                )
                .map_err(|e| to_sql_err("deleting by source", e))?;
                Ok(())
            }
            _ => {
                // Fall back to a full scan for less common filter shapes
                // (file_type equality, regex predicates).
                let matching = self.get(name, filter)?;
                let conn = self.lock()?;
                for chunk in matching {
                    conn.execute(
                        "DELETE FROM chunks WHERE collection = ?1 AND id = ?2",
                        rusqlite::params![name, chunk.id],
                    )
                    .map_err(|e| to_sql_err("deleting by id", e))?;
                }
                Ok(())
            }
        }
    }

    fn count(&self, name: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
                [name],
                |row| row.get(0),
            )
            .map_err(|e| to_sql_err("counting", e))?;
        Ok(count as usize)
    }
}

fn row_to_stored_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredChunk> {
    let page: Option<i64> = row.get(5)?;
    Ok(StoredChunk {
        id: row.get(0)?,
        document: row.get(1)?,
        metadata: ChunkMetadata {
            source: row.get(2)?,
            file_type: row.get(3)?,
            chunk_id: row.get::<_, i64>(4)? as usize,
            page: page.map(|p| p as u32),
            section: row.get(6)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(source: &str) -> ChunkMetadata {
        ChunkMetadata {
            source: source.to_string(),
            file_type: "txt".to_string(),
            chunk_id: 0,
            page: None,
            section: None,
        }
    }

    #[test]
    fn add_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        store
            .add(
                "rag_docs",
                &[("id1".to_string(), vec![1.0, 0.0], "doc one".to_string(), meta("/a.txt"))],
            )
            .unwrap_or_else(|_| unreachable!());
        let got = store.get("rag_docs", &MetadataFilter::All).unwrap_or_else(|_| unreachable!());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].document, "doc one");
    }

    #[test]
    fn duplicate_id_upsert_keeps_latest_content() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        let rows = vec![
            ("id1".to_string(), vec![1.0, 0.0], "first".to_string(), meta("/a.txt")),
            ("id1".to_string(), vec![1.0, 0.0], "second".to_string(), meta("/a.txt")),
        ];
        store.add("rag_docs", &rows).unwrap_or_else(|_| unreachable!());
        assert_eq!(store.count("rag_docs").unwrap_or_else(|_| unreachable!()), 1);
    }

    #[test]
    fn query_orders_by_cosine_similarity_descending() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        store
            .add(
                "rag_docs",
                &[
                    ("a".to_string(), vec![1.0, 0.0], "close".to_string(), meta("/a.txt")),
                    ("b".to_string(), vec![0.0, 1.0], "far".to_string(), meta("/b.txt")),
                ],
            )
            .unwrap_or_else(|_| unreachable!());
        let results = store
            .query("rag_docs", &[1.0, 0.0], 2, &MetadataFilter::All)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(results[0].document, "close");
    }

    #[test]
    fn delete_by_source_removes_only_that_files_chunks() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        store
            .add(
                "rag_docs",
                &[
                    ("a".to_string(), vec![1.0], "a doc".to_string(), meta("/a.txt")),
                    ("b".to_string(), vec![1.0], "b doc".to_string(), meta("/b.txt")),
                ],
            )
            .unwrap_or_else(|_| unreachable!());
        store
            .delete(
                "rag_docs",
                &MetadataFilter::Equals {
                    field: "source",
                    value: "/a.txt".to_string(),
                },
            )
            .unwrap_or_else(|_| unreachable!());
        let remaining = store.get("rag_docs", &MetadataFilter::All).unwrap_or_else(|_| unreachable!());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].metadata.source, "/b.txt");
    }

    #[test]
    fn empty_collection_queries_return_empty() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        let results = store
            .query("rag_docs", &[1.0, 0.0], 5, &MetadataFilter::All)
            .unwrap_or_else(|_| unreachable!());
        assert!(results.is_empty());
    }
}
