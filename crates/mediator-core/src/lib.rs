use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Configuration types shared across all mediator crates
pub mod config;

// The per-cycle audit record
pub mod event;

pub use config::{
    AuditConfig, ConfigError, KnowledgeBaseConfig, MediatorConfig, PolicyConfig, ReportConfig,
    SanitizerConfig,
};
pub use event::{AuditEvent, AuditEventBuilder, ToolCallRecord};

/// Argument map of a proposed action.
///
/// Values are kept as raw JSON because the proposer is untrusted: a
/// wrong-typed value must reach the policy engine and fail there.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// String value of `name` in `args`.
///
/// Missing and non-string arguments read as `""` so that every rule sees
/// them as empty input and fails closed.
pub fn argument_str<'a>(args: &'a Arguments, name: &str) -> &'a str {
    args.get(name).and_then(|v| v.as_str()).unwrap_or_default()
}

/// The closed set of action kinds the mediator knows how to vet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// send-message
    SendEmail,
    /// run-query
    DbQuery,
    /// fetch-url
    HttpGet,
}

impl ToolKind {
    /// Every known kind, in catalog order.
    pub const ALL: [ToolKind; 3] = [ToolKind::SendEmail, ToolKind::DbQuery, ToolKind::HttpGet];

    /// Wire name used by proposers and in audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::SendEmail => "send_email",
            ToolKind::DbQuery => "db_query",
            ToolKind::HttpGet => "http_get",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tool name is outside the known catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// A candidate tool invocation produced by an untrusted proposer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    /// Tool name exactly as proposed. Not guaranteed to be a known [`ToolKind`].
    pub tool: String,
    #[serde(default)]
    pub args: Arguments,
}

impl ProposedAction {
    pub fn new(tool: impl Into<String>, args: Arguments) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }

    /// Build an action from string pairs.
    pub fn with_args<'a>(
        tool: impl Into<String>,
        args: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let args = args
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        Self::new(tool, args)
    }

    /// String value of an argument. See [`argument_str`].
    pub fn arg_str(&self, name: &str) -> &str {
        argument_str(&self.args, name)
    }

    /// Parse the tool name into a known kind.
    pub fn kind(&self) -> Result<ToolKind, UnknownTool> {
        self.tool.parse()
    }
}

/// The rule that produced a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    Allowlist,
    SensitiveContent,
    EmailDomain,
    MessageBypass,
    QueryVerb,
    QueryInjection,
    Ssrf,
    MalformedAction,
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyRule::Allowlist => "allowlist",
            PolicyRule::SensitiveContent => "sensitive_content",
            PolicyRule::EmailDomain => "email_domain",
            PolicyRule::MessageBypass => "message_bypass",
            PolicyRule::QueryVerb => "query_verb",
            PolicyRule::QueryInjection => "query_injection",
            PolicyRule::Ssrf => "ssrf",
            PolicyRule::MalformedAction => "malformed_action",
        };
        f.write_str(s)
    }
}

/// Permit/deny verdict for one proposed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    /// Human-readable explanation, specific enough to identify the rule.
    pub reason: String,
    /// The rule that denied the action. Absent on permit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<PolicyRule>,
}

impl Decision {
    pub fn permit(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            rule: None,
        }
    }

    pub fn deny(rule: PolicyRule, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            rule: Some(rule),
        }
    }
}

/// Output of the content sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationResult {
    pub text: String,
    /// Number of catalog patterns that matched.
    pub hits: usize,
}

impl SanitizationResult {
    /// Result for text that was not inspected.
    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hits: 0,
        }
    }
}

/// What a proposer returns: a reply and, optionally, an action to take.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ProposedAction>,
}

impl Proposal {
    /// A reply with no action.
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: None,
        }
    }

    pub fn act(message: impl Into<String>, action: ProposedAction) -> Self {
        Self {
            message: message.into(),
            action: Some(action),
        }
    }
}

/// One input to the mediation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediationCase {
    pub case_id: String,
    pub user_input: String,
    /// Text retrieved from an external source. Always untrusted.
    #[serde(default)]
    pub untrusted_context: String,
}

impl MediationCase {
    pub fn new(
        case_id: impl Into<String>,
        user_input: impl Into<String>,
        untrusted_context: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            user_input: user_input.into(),
            untrusted_context: untrusted_context.into(),
        }
    }
}

/// Identifiers passed alongside an action to the policy engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMeta {
    pub case_id: String,
    pub run_idx: u32,
}
