//! # mediator-audit
//!
//! Append-only audit trail for mediation cycles.
//!
//! This crate provides:
//! - Storage backends for [`AuditEvent`](mediator_core::AuditEvent) records
//!   (JSON Lines file, console, in-memory, no-op)
//! - [`AuditLogger`], the sink the orchestrator writes to
//! - [`summarize`], which reduces an event sequence to a [`Report`]
//!
//! ## Output
//!
//! - **File output**: JSON Lines, one event per line, written in order
//! - **Console output**: `[AUDIT]` prefixed lines
//! - **Report**: pretty JSON with counts and one row per case of the last run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mediator_audit::{AuditLogger, summarize};
//! use mediator_core::{AuditConfig, AuditEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = AuditLogger::new(&AuditConfig::default(), "run_rag_filter")?;
//! logger.log(&AuditEvent::builder("A_prompt_injection", 1).build()).await?;
//!
//! let report = summarize(&logger.events().await?);
//! report.write_to("reports/run_rag_filter_summary.json")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logger;
pub mod report;
pub mod storage;

pub use error::AuditError;
pub use logger::AuditLogger;
pub use report::{CaseSummary, Disposition, Mode, Report, summarize};
pub use storage::{
    AuditStorage, ConsoleStorage, DualStorage, FileStorage, MemoryStorage, NullStorage, read_log,
};
