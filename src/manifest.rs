//! Index Manifest (`spec.md` §3, §6, §9): maps absolute source path to the
//! SHA-256 of its bytes at last successful index, enabling incremental
//! reindexing.
//!
//! Ordering hazard resolution (§9 open question): callers must call
//! [`Manifest::record`] only *after* a path's chunks have been embedded and
//! upserted into the vector store, then persist with [`Manifest::save`],
//! which writes atomically (temp file + rename) so a crash mid-run never
//! leaves a manifest claiming a file is indexed when it isn't.

use std::collections::BTreeMap;
use std::io::Read as _;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{RagError, Result};

/// Manifest file name within the index directory.
pub const MANIFEST_FILE: &str = ".manifest.json";

/// Absolute path → SHA-256 hex digest.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Manifest(BTreeMap<String, String>);

impl Manifest {
    /// Loads the manifest from `<index_dir>/.manifest.json`, or an empty
    /// manifest if the file does not exist.
    pub fn load(index_dir: &Path) -> Result<Self> {
        let path = index_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)
            .map_err(|e| RagError::io(format!("reading manifest {}", path.display()), e))?;
        let map: BTreeMap<String, String> = serde_json::from_str(&data)
            .map_err(|e| RagError::json(format!("parsing manifest {}", path.display()), e))?;
        Ok(Self(map))
    }

    /// Persists the manifest as indented JSON, atomically (write to a temp
    /// file in the same directory, then rename).
    pub fn save(&self, index_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(index_dir)
            .map_err(|e| RagError::io(format!("creating index dir {}", index_dir.display()), e))?;
        let path = index_dir.join(MANIFEST_FILE);
        let tmp_path = index_dir.join(format!(".{MANIFEST_FILE}.tmp"));
        let json = serde_json::to_string_pretty(&self.0)
            .map_err(|e| RagError::json("serializing manifest", e))?;
        std::fs::write(&tmp_path, json)
            .map_err(|e| RagError::io(format!("writing {}", tmp_path.display()), e))?;
        std::fs::rename(&tmp_path, &path)
            .map_err(|e| RagError::io(format!("renaming into {}", path.display()), e))?;
        Ok(())
    }

    /// Returns the recorded hash for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Records `path`'s current hash. Call only after a successful upsert.
    pub fn record(&mut self, path: impl Into<String>, sha256_hex: impl Into<String>) {
        self.0.insert(path.into(), sha256_hex.into());
    }

    /// Whether `path` is unchanged relative to the manifest.
    #[must_use]
    pub fn is_unchanged(&self, path: &str, current_sha256_hex: &str) -> bool {
        self.get(path) == Some(current_sha256_hex)
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the manifest has no recorded paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes the SHA-256 hex digest of a file's bytes.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| RagError::io(format!("opening {}", path.display()), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| RagError::io(format!("reading {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
