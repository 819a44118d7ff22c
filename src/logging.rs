//! Structured JSON-lines event logging.
//!
//! One JSON object per line, written to `~/.config/<app>/rag.log`, with a
//! fixed `ts`/`event` envelope and event-specific fields merged in (§6
//! "Filesystem layout"). A `Logger` owns the open file handle and an
//! optional [`crate::alert::AlertSink`] so every event can be evaluated for
//! alerting in one place instead of scattering webhook calls through the
//! pipeline.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value, json};

use crate::alert::AlertSink;

/// Returns the default log file path, `~/.config/<app>/rag.log`.
#[must_use]
pub fn default_log_path(app: &str) -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
    base.join(app).join("rag.log")
}

/// A structured event logger writing newline-delimited JSON.
pub struct Logger {
    file: Mutex<File>,
    verbose: bool,
    alert: Option<AlertSink>,
}

impl Logger {
    /// Opens (creating parent directories as needed) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the parent directory or file cannot be created.
    pub fn open(path: &Path, verbose: bool, alert: Option<AlertSink>) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            verbose,
            alert,
        })
    }

    /// Records one event with arbitrary extra fields, merged alongside
    /// `ts`/`event`. Extra fields should be an object built with [`json!`].
    pub fn event(&self, event: &str, mut fields: Value) {
        let ts = chrono::Utc::now().to_rfc3339();
        let mut obj = Map::new();
        obj.insert("ts".to_string(), Value::String(ts));
        obj.insert("event".to_string(), Value::String(event.to_string()));
        if let Some(extra) = fields.as_object_mut() {
            for (k, v) in std::mem::take(extra) {
                obj.insert(k, v);
            }
        }
        let line = Value::Object(obj);

        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
        if self.verbose {
            let stderr = std::io::stderr();
            let mut handle = stderr.lock();
            let _ = writeln!(handle, "{line}");
        }
        if let Some(sink) = &self.alert {
            sink.maybe_alert(event, &line);
        }
    }

    /// Convenience wrapper for a bare event with no extra fields.
    pub fn event_simple(&self, event: &str) {
        self.event(event, json!({}));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("rag.log");
        let logger = Logger::open(&path, false, None).unwrap_or_else(|_| unreachable!());
        logger.event("rerank_fallback", json!({"reason": "model_load_failed"}));
        logger.event_simple("index_complete");

        let mut contents = String::new();
        File::open(&path)
            .unwrap_or_else(|_| unreachable!())
            .read_to_string(&mut contents)
            .unwrap_or_else(|_| unreachable!());
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap_or_else(|_| unreachable!());
        assert_eq!(first["event"], "rerank_fallback");
        assert_eq!(first["reason"], "model_load_failed");
        assert!(first["ts"].is_string());
    }

    #[test]
    fn default_log_path_uses_xdg_config_home() {
        // SAFETY: test-only env mutation, single-threaded within this test.
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test");
        }
        let path = default_log_path("ragrs");
        assert_eq!(path, PathBuf::from("/tmp/xdg-test/ragrs/rag.log"));
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }
}
