//! `mediator check-action` - evaluate one action against the policy.

use anyhow::Result;
use mediator_core::{Arguments, ContextMeta, Decision, MediatorConfig};
use mediator_policy::PolicyEngine;
use serde_json::Value;

/// Parse a `key=value` argument. The value may itself contain `=`.
pub fn parse_arg(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty argument name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn run(config: &MediatorConfig, tool: &str, args: Vec<(String, String)>) -> Result<()> {
    let decision = evaluate(config, tool, args);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn evaluate(config: &MediatorConfig, tool: &str, args: Vec<(String, String)>) -> Decision {
    let args: Arguments = args
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    let meta = ContextMeta {
        case_id: "cli".to_string(),
        run_idx: 0,
    };
    PolicyEngine::from_config(&config.policy).validate(tool, &args, &meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator_core::PolicyRule;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(
            parse_arg("query=SELECT 1 WHERE a=b").unwrap(),
            ("query".to_string(), "SELECT 1 WHERE a=b".to_string())
        );
        assert!(parse_arg("novalue").is_err());
        assert!(parse_arg("=x").is_err());
    }

    #[test]
    fn test_evaluate_uses_configured_domains() {
        let mut config = MediatorConfig::default();
        let args = pairs(&[("to", "ops@corp.test"), ("body", "hi")]);

        let denied = evaluate(&config, "send_email", args.clone());
        assert_eq!(denied.rule, Some(PolicyRule::EmailDomain));

        config.policy.allowed_email_domains = vec!["corp.test".to_string()];
        assert!(evaluate(&config, "send_email", args).allowed);
    }

    #[test]
    fn test_evaluate_ssrf() {
        let config = MediatorConfig::default();
        let decision = evaluate(
            &config,
            "http_get",
            pairs(&[("url", "http://169.254.169.254/latest/meta-data")]),
        );
        assert!(!decision.allowed);
        assert_eq!(decision.rule, Some(PolicyRule::Ssrf));
    }
}
