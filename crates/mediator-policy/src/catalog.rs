//! Fixed rule catalogs.
//!
//! Rules are data: each catalog is an ordered list of `(label, pattern)`
//! so a rule can be tested on its own and the reason string names the
//! entry that fired.

use mediator_core::ToolKind;
use regex::Regex;
use std::sync::LazyLock;

/// Tools the engine will ever permit.
pub const PERMITTED_TOOLS: &[ToolKind] = &[ToolKind::SendEmail, ToolKind::DbQuery, ToolKind::HttpGet];

/// Credential and internal-prompt markers. Matched case-insensitively as
/// substrings of the serialized argument map.
pub const SENSITIVE_KEYWORDS: &[&str] = &["api_key", "system_prompt", "secret", "password", "token"];

/// Directive phrasing that must not appear in an outgoing message body.
pub const BYPASS_PATTERNS: &[(&str, &str)] = &[
    ("ignore", r"\bignore\b"),
    ("override", r"\boverride\b"),
    ("bypass", r"\bbypass\b"),
    ("debug mode", r"\bdebug\s+mode\b"),
];

/// The only verb a query may start with.
pub const READ_ONLY_VERB: &str = r"^select\b";

/// Structural injection signatures. A syntactic blocklist, not a parser:
/// obfuscated payloads (inline comments inside keywords, encodings,
/// alternate tautologies) can evade it.
pub const QUERY_INJECTION_PATTERNS: &[(&str, &str)] = &[
    ("comment terminator", r"--|/\*"),
    ("statement separator", r";"),
    ("tautology", r"\bor\s+1\s*=\s*1\b|\bor\s+'([^']*)'\s*=\s*'([^']*)'"),
    ("destructive verb", r"\b(?:drop|delete|truncate|alter)\b"),
    ("set combination", r"\bunion\b"),
];

/// Internal and metadata address patterns. Textual only: no DNS resolution
/// and no redirect following, so a public name that resolves internally
/// is not caught here. Numeric prefixes count at any position a host can
/// start: start of text, or after `/`, `@`, `=`, `:` or `[`. The last two
/// cover IPv4-mapped IPv6 literals such as `[::ffff:10.0.0.5]`.
pub const SSRF_PATTERNS: &[(&str, &str)] = &[
    ("loopback localhost", r"\blocalhost\b"),
    ("loopback 127.0.0.0/8", r"(?:^|[/@=:\[])127\."),
    ("loopback ::1", r"\[::1\]"),
    ("link-local metadata 169.254.169.254", r"169\.254\.169\.254"),
    ("private 10.0.0.0/8", r"(?:^|[/@=:\[])10\."),
    ("private 192.168.0.0/16", r"(?:^|[/@=:\[])192\.168\."),
    ("private 172.16.0.0/12", r"(?:^|[/@=:\[])172\.(?:1[6-9]|2\d|3[01])\."),
];

/// A compiled `(label, pattern)` entry.
#[derive(Debug)]
pub struct Signature {
    pub label: &'static str,
    pub regex: Regex,
}

fn compile(patterns: &'static [(&'static str, &'static str)]) -> Vec<Signature> {
    patterns
        .iter()
        .map(|&(label, pattern)| Signature {
            label,
            regex: Regex::new(&format!("(?i){pattern}")).expect("catalog pattern"),
        })
        .collect()
}

pub(crate) static BYPASS: LazyLock<Vec<Signature>> = LazyLock::new(|| compile(BYPASS_PATTERNS));

pub(crate) static QUERY_INJECTION: LazyLock<Vec<Signature>> =
    LazyLock::new(|| compile(QUERY_INJECTION_PATTERNS));

pub(crate) static SSRF: LazyLock<Vec<Signature>> = LazyLock::new(|| compile(SSRF_PATTERNS));

pub(crate) static READ_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){READ_ONLY_VERB}")).expect("read-only verb"));

/// First signature in `catalog` matching `text`.
pub(crate) fn first_match<'a>(catalog: &'a [Signature], text: &str) -> Option<&'a Signature> {
    catalog.iter().find(|sig| sig.regex.is_match(text))
}
