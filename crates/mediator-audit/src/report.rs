//! Run summaries.
//!
//! [`summarize`] is a pure reduction over an event sequence. It never
//! touches storage, so the same report can be rebuilt from a log file at
//! any time.

use crate::error::AuditError;
use mediator_core::AuditEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Whether the summarized run had sanitization on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every event was sanitized.
    #[serde(rename = "rag_filter")]
    Sanitized,
    /// No event was sanitized (baseline).
    #[serde(rename = "no_rag_filter")]
    Unsanitized,
    /// Both kinds of events.
    Mixed,
    /// No events at all.
    Empty,
}

impl Mode {
    fn of(events: &[AuditEvent]) -> Self {
        let sanitized = events.iter().filter(|e| e.sanitization_enabled).count();
        match sanitized {
            _ if events.is_empty() => Mode::Empty,
            n if n == events.len() => Mode::Sanitized,
            0 => Mode::Unsanitized,
            _ => Mode::Mixed,
        }
    }
}

/// Final outcome of one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// An action was proposed and permitted.
    Permitted,
    /// An action was proposed and denied.
    Blocked,
    /// Sanitization found instructions and no action was proposed.
    Prevented,
    /// A collaborator failed before an action could be vetted.
    Faulted,
    /// No action and nothing to prevent.
    NoAction,
}

impl Disposition {
    pub fn of(event: &AuditEvent) -> Self {
        match event.allowed() {
            Some(true) => Disposition::Permitted,
            Some(false) => Disposition::Blocked,
            None if event.error.is_some() => Disposition::Faulted,
            None if event.is_prevented() => Disposition::Prevented,
            None => Disposition::NoAction,
        }
    }
}

/// One row per case of the most recent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub sanitizer_hits: usize,
    pub tool: Option<String>,
    pub allowed: Option<bool>,
    pub reason: Option<String>,
    pub disposition: Disposition,
}

impl CaseSummary {
    fn of(event: &AuditEvent) -> Self {
        let tool_call = event.tool_call.as_ref();
        Self {
            case_id: event.case_id.clone(),
            sanitizer_hits: event.sanitizer_hits,
            tool: tool_call.map(|tc| tc.action.tool.clone()),
            allowed: tool_call.map(|tc| tc.decision.allowed),
            reason: tool_call.map(|tc| tc.decision.reason.clone()),
            disposition: Disposition::of(event),
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub mode: Mode,
    /// Highest run index seen.
    pub runs: u32,
    pub total_events: usize,
    /// Events with a proposed action.
    pub tool_calls: usize,
    pub allowed: usize,
    pub blocked: usize,
    /// Events where sanitization alone kept the proposer from acting.
    pub prevented: usize,
    pub cases: Vec<CaseSummary>,
}

impl Report {
    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), AuditError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Reduce an event sequence to a [`Report`].
pub fn summarize(events: &[AuditEvent]) -> Report {
    let mut tool_calls = 0;
    let mut allowed = 0;
    let mut blocked = 0;
    let mut prevented = 0;

    for event in events {
        match event.allowed() {
            Some(true) => {
                tool_calls += 1;
                allowed += 1;
            }
            Some(false) => {
                tool_calls += 1;
                blocked += 1;
            }
            None if event.is_prevented() => prevented += 1,
            None => {}
        }
    }

    let runs = events.iter().map(|e| e.run_idx).max().unwrap_or(0);

    // Latest event per case within the last run, in first-seen order
    let mut cases: Vec<CaseSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for event in events.iter().filter(|e| e.run_idx == runs) {
        let row = CaseSummary::of(event);
        match index.get(event.case_id.as_str()) {
            Some(&i) => cases[i] = row,
            None => {
                index.insert(event.case_id.as_str(), cases.len());
                cases.push(row);
            }
        }
    }

    Report {
        mode: Mode::of(events),
        runs,
        total_events: events.len(),
        tool_calls,
        allowed,
        blocked,
        prevented,
        cases,
    }
}
