//! Audit logger implementation.
//!
//! `AuditLogger` is the sink handed to the orchestrator. It picks a storage
//! backend from configuration and mirrors every record into `tracing`.

use mediator_core::{AuditConfig, AuditEvent};
use std::sync::Arc;

use crate::error::AuditError;
use crate::storage::{AuditStorage, DualStorage, FileStorage, MemoryStorage, NullStorage};

/// The audit sink.
pub struct AuditLogger {
    enabled: bool,
    storage: Arc<dyn AuditStorage>,
}

impl AuditLogger {
    /// Create a logger that writes `<directory>/<prefix>.jsonl`, truncating
    /// any earlier log with the same prefix.
    pub fn new(config: &AuditConfig, prefix: &str) -> Result<Self, AuditError> {
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(AuditError::InitializationFailed(format!(
                "invalid log prefix '{}'",
                prefix
            )));
        }

        let storage: Arc<dyn AuditStorage> = if !config.enabled {
            Arc::new(NullStorage::new())
        } else {
            let file = FileStorage::create(config.log_path(prefix))?;
            if config.stdout {
                // Dual output: file + console
                Arc::new(DualStorage::new(file))
            } else {
                Arc::new(file)
            }
        };

        Ok(Self {
            enabled: config.enabled,
            storage,
        })
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(storage: Arc<dyn AuditStorage>) -> Self {
        Self {
            enabled: true,
            storage,
        }
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            storage: Arc::new(NullStorage::new()),
        }
    }

    /// Create a logger that keeps events in memory.
    pub fn in_memory() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// Check if logging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append an event to the trail.
    pub async fn log(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if !self.enabled {
            return Ok(());
        }

        // Also log to tracing for structured logging integration
        tracing::debug!(
            event_id = %event.event_id,
            case_id = %event.case_id,
            run_idx = event.run_idx,
            tool = event.tool_call.as_ref().map(|tc| tc.action.tool.as_str()),
            allowed = event.allowed(),
            "Audit event"
        );

        self.storage.store(event).await
    }

    /// Everything recorded so far, in insertion order.
    pub async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        self.storage.events().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_logger() {
        let logger = AuditLogger::disabled();
        assert!(!logger.is_enabled());

        // Should not error even when logging
        logger
            .log(&AuditEvent::builder("A", 1).build())
            .await
            .unwrap();
        assert!(logger.events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_logger() {
        let logger = AuditLogger::in_memory();
        logger
            .log(&AuditEvent::builder("A", 1).build())
            .await
            .unwrap();
        assert_eq!(logger.events().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_logger_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AuditConfig {
            directory: dir.path().join("logs"),
            ..Default::default()
        };

        let logger = AuditLogger::new(&config, "run_rag_filter").unwrap();
        logger
            .log(&AuditEvent::builder("A", 1).build())
            .await
            .unwrap();

        assert!(config.log_path("run_rag_filter").exists());
        assert_eq!(logger.events().await.unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_path_in_prefix() {
        let config = AuditConfig::default();
        assert!(matches!(
            AuditLogger::new(&config, "../escape"),
            Err(AuditError::InitializationFailed(_))
        ));
    }
}
