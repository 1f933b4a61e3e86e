//! JSON Lines document store for retrieved content.
//!
//! Everything in here is untrusted. Documents are handed to the
//! orchestrator as context and always pass through the sanitizer.

use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub text: String,
}

/// Append-only document store backed by a single `.jsonl` file.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    path: PathBuf,
}

impl KnowledgeBase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a document. Re-ingesting an id shadows the earlier text.
    pub fn ingest(&self, doc_id: &str, text: &str) -> Result<(), RuntimeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&Document {
            doc_id: doc_id.to_string(),
            text: text.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        tracing::debug!(doc_id, path = %self.path.display(), "Document ingested");
        Ok(())
    }

    /// All records in file order. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<Document>, RuntimeError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| RuntimeError::MalformedDocument {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })
            })
            .collect()
    }

    /// The most recently ingested document with this id.
    pub fn get(&self, doc_id: &str) -> Result<Option<Document>, RuntimeError> {
        Ok(self.load()?.into_iter().rev().find(|d| d.doc_id == doc_id))
    }
}
