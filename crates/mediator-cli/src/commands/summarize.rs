//! `mediator summarize` - rebuild a report from an existing log.

use anyhow::{Context, Result};
use mediator_audit::{Report, read_log, summarize};
use std::path::Path;

pub fn run(log: &Path, out: Option<&Path>) -> Result<()> {
    let report = load(log)?;
    if let Some(out) = out {
        report
            .write_to(out)
            .with_context(|| format!("Failed to write report to {}", out.display()))?;
        tracing::info!(path = %out.display(), "Report written");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load(log: &Path) -> Result<Report> {
    let events =
        read_log(log).with_context(|| format!("Failed to read audit log {}", log.display()))?;
    Ok(summarize(&events))
}
