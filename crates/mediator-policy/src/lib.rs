//! # mediator-policy
//!
//! Deterministic allow/deny decisions for tool calls proposed by an
//! untrusted agent.
//!
//! The engine is a fixed catalog of rules, not a policy language. Each
//! catalog lives in [`catalog`] as ordered `(label, pattern)` data and the
//! denial reason names the entry that fired, so a decision can always be
//! traced back to one rule.
//!
//! | Rule | Applies to | Denies when |
//! |------|-----------|-------------|
//! | `allowlist` | all | tool is not `send_email`, `db_query` or `http_get` |
//! | `sensitive_content` | all | arguments mention `api_key`, `system_prompt`, `secret`, `password` or `token` |
//! | `email_domain` | `send_email` | destination is not an allowed domain or subdomain |
//! | `message_bypass` | `send_email` | body contains ignore/override/bypass/debug-mode phrasing |
//! | `query_verb` | `db_query` | query does not start with `SELECT` |
//! | `query_injection` | `db_query` | comment, separator, tautology, destructive verb or `UNION` |
//! | `ssrf` | `http_get` | URL names a loopback, metadata or private-network address |
//! | `malformed_action` | `http_get` | URL is missing or empty |
//!
//! The query and URL rules are textual blocklists. They do not parse SQL,
//! resolve DNS or follow redirects, and a sufficiently obfuscated payload
//! can get past them.

pub mod catalog;
pub mod error;
pub mod rules;
pub mod validator;

pub use error::PolicyViolation;
pub use rules::RulesValidator;
pub use validator::{PERMIT_REASON, PolicyEngine};
