//! Errors for the knowledge base and case loading.
//!
//! A mediation cycle itself never fails; these only cover the I/O around it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse case file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed knowledge base record in {path} at line {line}: {source}")]
    MalformedDocument {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("case '{case_id}' references unknown document '{doc_id}'")]
    UnknownDocument { case_id: String, doc_id: String },

    #[error("case '{0}' sets both untrusted_context and untrusted_doc")]
    ConflictingContext(String),

    #[error("invalid case file: {0}")]
    InvalidCases(String),
}
