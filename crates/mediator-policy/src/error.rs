//! Policy violation type.
//!
//! Every rule returns `Result<(), PolicyViolation>`. Violations never leave
//! the engine as errors: [`crate::PolicyEngine::validate`] turns the first one
//! into a deny [`Decision`].

use mediator_core::{Decision, PolicyRule};
use std::fmt;

/// A rule rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    /// The rule that fired.
    pub rule: PolicyRule,
    /// Human-readable reason.
    pub message: String,
}

impl PolicyViolation {
    /// Create a new policy violation.
    pub fn new(rule: PolicyRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }

    // =========================================================================
    // ALLOWLIST
    // =========================================================================

    /// Tool is outside the permitted set.
    pub fn tool_not_allowed(tool: &str) -> Self {
        Self::new(
            PolicyRule::Allowlist,
            format!("Tool '{}' is not permitted (deny-by-default)", tool),
        )
    }

    // =========================================================================
    // EXFILTRATION
    // =========================================================================

    /// Arguments mention a credential or internal-prompt marker.
    pub fn sensitive_content(keyword: &str) -> Self {
        Self::new(
            PolicyRule::SensitiveContent,
            format!(
                "Blocked: possible exfiltration of sensitive data (keyword '{}')",
                keyword
            ),
        )
    }

    // =========================================================================
    // SEND_EMAIL
    // =========================================================================

    /// Destination is not an allowed domain or a subdomain of one.
    pub fn email_domain_not_allowed(to: &str) -> Self {
        Self::new(
            PolicyRule::EmailDomain,
            format!("Blocked: email domain not permitted: {}", to),
        )
    }

    /// Message body carries bypass/override phrasing.
    pub fn bypass_phrasing(term: &str) -> Self {
        Self::new(
            PolicyRule::MessageBypass,
            format!(
                "Blocked: message body contains bypass/override phrasing ('{}')",
                term
            ),
        )
    }

    // =========================================================================
    // DB_QUERY
    // =========================================================================

    /// Query does not start with SELECT.
    pub fn query_not_read_only() -> Self {
        Self::new(
            PolicyRule::QueryVerb,
            "Blocked: only SELECT queries are permitted",
        )
    }

    /// Query matches a structural injection signature.
    pub fn query_injection(signature: &str) -> Self {
        Self::new(
            PolicyRule::QueryInjection,
            format!(
                "Blocked: SQL injection signature detected ({})",
                signature
            ),
        )
    }

    // =========================================================================
    // HTTP_GET
    // =========================================================================

    /// URL targets a loopback, link-local or private address.
    pub fn ssrf(target: &str) -> Self {
        Self::new(
            PolicyRule::Ssrf,
            format!(
                "Blocked: possible SSRF to internal network or metadata endpoint ({})",
                target
            ),
        )
    }

    // =========================================================================
    // MALFORMED INPUT
    // =========================================================================

    /// A required argument is missing, empty or not a string.
    pub fn missing_argument(tool: &str, name: &str) -> Self {
        Self::new(
            PolicyRule::MalformedAction,
            format!(
                "Blocked: '{}' requires a non-empty string argument '{}'",
                tool, name
            ),
        )
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PolicyViolation {}

impl From<PolicyViolation> for Decision {
    fn from(violation: PolicyViolation) -> Self {
        Decision::deny(violation.rule, violation.message)
    }
}
