//! Audit logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Echo every event to stdout in addition to the log file.
    #[serde(default)]
    pub stdout: bool,

    /// Directory that receives `<prefix>.jsonl` logs.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl AuditConfig {
    /// Path of the JSON Lines log for a run prefix.
    pub fn log_path(&self, prefix: &str) -> PathBuf {
        self.directory.join(format!("{prefix}.jsonl"))
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            stdout: false,
            directory: default_directory(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_directory() -> PathBuf {
    PathBuf::from("logs")
}
