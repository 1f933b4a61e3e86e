//! Configuration types for the mediator.
//!
//! Configuration is a single YAML file. Every section has defaults, so an
//! empty file (or no file at all) yields a working setup.
//!
//! ```yaml
//! policy:
//!   allowed_email_domains: [axa.com, example.com]
//! sanitizer:
//!   enabled: true
//! audit:
//!   directory: logs
//!   stdout: false
//! report:
//!   directory: reports
//! knowledge_base:
//!   path: kb.jsonl
//! ```
//!
//! The rule catalogs are fixed in code and cannot be changed here. Only the
//! allowed destination domains are deployment-specific.

pub mod audit;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use audit::AuditConfig;

/// Complete mediator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub sanitizer: SanitizerConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
}

/// Policy engine parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Destination domains for `send_email`. Subdomains are accepted too.
    #[serde(default = "default_allowed_email_domains")]
    pub allowed_email_domains: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_email_domains: default_allowed_email_domains(),
        }
    }
}

/// Sanitizer switch.
///
/// Disabling it is a comparison mode for measuring what the sanitizer
/// prevents, not a production setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Where run summaries are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: PathBuf,
}

impl ReportConfig {
    /// Path of the summary report for a run prefix.
    pub fn report_path(&self, prefix: &str) -> PathBuf {
        self.directory.join(format!("{prefix}_summary.json"))
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
        }
    }
}

/// Location of the retrieved-document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_kb_path")]
    pub path: PathBuf,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_allowed_email_domains() -> Vec<String> {
    vec!["axa.com".to_string(), "example.com".to_string()]
}

fn default_report_directory() -> PathBuf {
    PathBuf::from("reports")
}

fn default_kb_path() -> PathBuf {
    PathBuf::from("kb.jsonl")
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MediatorConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that would make the engine deny everything silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for domain in &self.policy.allowed_email_domains {
            let d = domain.trim();
            if d.is_empty() || d.contains('@') || d.starts_with('.') {
                return Err(ConfigError::Config(format!(
                    "invalid allowed email domain '{}'",
                    domain
                )));
            }
        }
        Ok(())
    }
}
