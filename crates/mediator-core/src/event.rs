//! Audit event for one mediation cycle.
//!
//! An event is created once per cycle and never mutated afterwards. The
//! action, its decision and the execution result travel together in a
//! [`ToolCallRecord`], so an event carries a decision exactly when it
//! carries a proposed action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Decision, ProposedAction};

/// A proposed action together with its verdict and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub action: ProposedAction,
    pub decision: Decision,
    /// Executor output on permit, a synthesized `blocked` result on deny.
    pub result: serde_json::Value,
}

impl ToolCallRecord {
    /// Record for an action the policy engine denied. Nothing was dispatched.
    pub fn blocked(action: ProposedAction, decision: Decision) -> Self {
        let result = serde_json::json!({
            "status": "blocked",
            "reason": decision.reason,
        });
        Self {
            action,
            decision,
            result,
        }
    }

    /// Record for a permitted action and whatever the executor returned.
    pub fn executed(action: ProposedAction, decision: Decision, result: serde_json::Value) -> Self {
        Self {
            action,
            decision,
            result,
        }
    }
}

/// One record of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: Uuid,

    /// When the cycle completed.
    pub occurred_at: DateTime<Utc>,

    // ===== Identity: (case_id, run_idx) orders the trail =====
    pub case_id: String,

    /// 1-based repetition index.
    pub run_idx: u32,

    // ===== Inputs =====
    pub user_input: String,

    /// Untrusted context as retrieved.
    pub untrusted_raw: String,

    /// Untrusted context as handed to the proposer.
    pub untrusted_used: String,

    pub sanitization_enabled: bool,

    /// Catalog patterns neutralized in the untrusted context.
    pub sanitizer_hits: usize,

    // ===== Outcome =====
    /// Free-text reply from the proposer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer_message: Option<String>,

    #[serde(default)]
    pub tool_call: Option<ToolCallRecord>,

    /// A collaborator fault captured during the cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn builder(case_id: impl Into<String>, run_idx: u32) -> AuditEventBuilder {
        AuditEventBuilder::new(case_id, run_idx)
    }

    /// Whether a tool call was proposed in this cycle.
    pub fn has_tool_call(&self) -> bool {
        self.tool_call.is_some()
    }

    /// Whether the proposed action was permitted. `None` when nothing was proposed.
    pub fn allowed(&self) -> Option<bool> {
        self.tool_call.as_ref().map(|tc| tc.decision.allowed)
    }

    /// Sanitization alone defused an injection: hits were found and the
    /// proposer did not act. A cycle that faulted never counts.
    pub fn is_prevented(&self) -> bool {
        self.sanitization_enabled
            && self.sanitizer_hits > 0
            && self.tool_call.is_none()
            && self.error.is_none()
    }

    /// Format the event as a single human-readable line.
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] case={} run={} sanitized={} hits={}",
            self.occurred_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.case_id,
            self.run_idx,
            self.sanitization_enabled,
            self.sanitizer_hits,
        );

        match &self.tool_call {
            Some(tc) => {
                let verdict = if tc.decision.allowed { "ALLOWED" } else { "BLOCKED" };
                line.push_str(&format!(
                    " tool={} {} reason=\"{}\"",
                    tc.action.tool,
                    verdict,
                    tc.decision.reason.replace('"', "'")
                ));
            }
            None => line.push_str(" tool=none"),
        }

        if let Some(ref error) = self.error {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        line
    }
}

/// Builder for [`AuditEvent`]. Consumed by `build`, after which the event is final.
#[derive(Debug)]
pub struct AuditEventBuilder {
    event: AuditEvent,
}

impl AuditEventBuilder {
    pub fn new(case_id: impl Into<String>, run_idx: u32) -> Self {
        Self {
            event: AuditEvent {
                event_id: Uuid::new_v4(),
                occurred_at: Utc::now(),
                case_id: case_id.into(),
                run_idx,
                user_input: String::new(),
                untrusted_raw: String::new(),
                untrusted_used: String::new(),
                sanitization_enabled: false,
                sanitizer_hits: 0,
                proposer_message: None,
                tool_call: None,
                error: None,
            },
        }
    }

    pub fn user_input(mut self, input: impl Into<String>) -> Self {
        self.event.user_input = input.into();
        self
    }

    /// Set the raw and the sanitized untrusted context together.
    pub fn untrusted(
        mut self,
        raw: impl Into<String>,
        used: impl Into<String>,
        sanitization_enabled: bool,
        hits: usize,
    ) -> Self {
        self.event.untrusted_raw = raw.into();
        self.event.untrusted_used = used.into();
        self.event.sanitization_enabled = sanitization_enabled;
        self.event.sanitizer_hits = hits;
        self
    }

    pub fn proposer_message(mut self, message: impl Into<String>) -> Self {
        self.event.proposer_message = Some(message.into());
        self
    }

    pub fn tool_call(mut self, record: ToolCallRecord) -> Self {
        self.event.tool_call = Some(record);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.event.error = Some(error.into());
        self
    }

    pub fn build(mut self) -> AuditEvent {
        self.event.occurred_at = Utc::now();
        self.event
    }
}
