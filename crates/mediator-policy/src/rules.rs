//! Kind-specific rules.
//!
//! This module validates the arguments of each permitted tool:
//! - `send_email`: destination domain and message body
//! - `db_query`: read-only verb and injection signatures
//! - `http_get`: internal/metadata address patterns

use crate::catalog::{self, SENSITIVE_KEYWORDS};
use crate::error::PolicyViolation;
use mediator_core::{Arguments, ToolKind, argument_str};

/// Validates the arguments of one action against the fixed catalogs.
pub struct RulesValidator<'a> {
    /// Lowercased allowed destination domains.
    allowed_domains: &'a [String],
}

impl<'a> RulesValidator<'a> {
    /// Create a new rules validator.
    pub fn new(allowed_domains: &'a [String]) -> Self {
        Self { allowed_domains }
    }

    /// Reject any argument set that mentions a sensitive keyword.
    ///
    /// The whole map is serialized (keys included) so that a secret cannot
    /// hide in an argument no other rule reads.
    pub fn validate_sensitive(&self, args: &Arguments) -> Result<(), PolicyViolation> {
        let blob = serde_json::to_string(args)
            .unwrap_or_default()
            .to_lowercase();

        match SENSITIVE_KEYWORDS.iter().find(|k| blob.contains(**k)) {
            Some(keyword) => Err(PolicyViolation::sensitive_content(keyword)),
            None => Ok(()),
        }
    }

    /// Dispatch to the rules of `kind`.
    pub fn validate_kind(&self, kind: ToolKind, args: &Arguments) -> Result<(), PolicyViolation> {
        match kind {
            ToolKind::SendEmail => self.validate_send_email(args),
            ToolKind::DbQuery => self.validate_db_query(args),
            ToolKind::HttpGet => self.validate_http_get(args),
        }
    }

    /// Destination must be an allowed domain; body must not carry bypass phrasing.
    pub fn validate_send_email(&self, args: &Arguments) -> Result<(), PolicyViolation> {
        let to = argument_str(args, "to");
        if !self.domain_allowed(to) {
            return Err(PolicyViolation::email_domain_not_allowed(to));
        }

        let body = argument_str(args, "body");
        if let Some(sig) = catalog::first_match(&catalog::BYPASS, body) {
            return Err(PolicyViolation::bypass_phrasing(sig.label));
        }

        Ok(())
    }

    /// Query must start with SELECT and match no injection signature.
    pub fn validate_db_query(&self, args: &Arguments) -> Result<(), PolicyViolation> {
        let query = argument_str(args, "query").trim();
        if !catalog::READ_ONLY.is_match(query) {
            return Err(PolicyViolation::query_not_read_only());
        }

        if let Some(sig) = catalog::first_match(&catalog::QUERY_INJECTION, query) {
            return Err(PolicyViolation::query_injection(sig.label));
        }

        Ok(())
    }

    /// URL must be present and not point at an internal or metadata address.
    pub fn validate_http_get(&self, args: &Arguments) -> Result<(), PolicyViolation> {
        let url = argument_str(args, "url").trim();
        if url.is_empty() {
            return Err(PolicyViolation::missing_argument(ToolKind::HttpGet.as_str(), "url"));
        }

        if let Some(sig) = catalog::first_match(&catalog::SSRF, url) {
            return Err(PolicyViolation::ssrf(sig.label));
        }

        Ok(())
    }

    /// Exact match or proper subdomain of an allowed entry.
    ///
    /// The domain is everything after the first `@` and must be a single
    /// hostname: only `[a-z0-9.-]` with no empty labels. Recipient lists
    /// (`a@evil.com,b@example.com`), extra `@` and whitespace fail closed.
    pub fn domain_allowed(&self, address: &str) -> bool {
        let address = address.trim().to_lowercase();
        let Some((_, domain)) = address.split_once('@') else {
            return false;
        };
        if !is_single_hostname(domain) {
            return false;
        }

        self.allowed_domains.iter().any(|allowed| {
            domain == allowed.as_str()
                || domain
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

fn is_single_hostname(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
        && domain.split('.').all(|label| !label.is_empty())
}
