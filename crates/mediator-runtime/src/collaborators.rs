use async_trait::async_trait;
use mediator_core::{Arguments, Proposal, ToolKind};

/// Produces proposed actions. Untrusted: whatever it returns goes through
/// the policy engine before anything is executed.
#[async_trait]
pub trait Proposer: Send + Sync {
    /// Decide on a reply and an optional action from the user input and the
    /// (possibly sanitized) retrieved context.
    async fn propose(&self, user_input: &str, context: &str) -> anyhow::Result<Proposal>;
}

/// Carries out permitted actions.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a permitted action. Only ever called after a permit decision.
    async fn execute(&self, kind: ToolKind, args: &Arguments) -> anyhow::Result<serde_json::Value>;
}
