use crate::collaborators::{Executor, Proposer};
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use mediator_audit::AuditLogger;
use mediator_core::{
    AuditEvent, ContextMeta, MediationCase, ProposedAction, SanitizationResult, ToolCallRecord,
};
use mediator_policy::PolicyEngine;
use mediator_sanitizer::Sanitizer;
use serde_json::json;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Wires sanitizer, proposer, policy engine and executor into one cycle per
/// case, and appends every cycle to the audit trail.
pub struct Orchestrator<P: Proposer, E: Executor> {
    sanitizer: Sanitizer,
    policy: PolicyEngine,
    proposer: P,
    executor: E,
    audit: Arc<AuditLogger>,
}

impl<P: Proposer, E: Executor> Orchestrator<P, E> {
    pub fn new(policy: PolicyEngine, proposer: P, executor: E, audit: Arc<AuditLogger>) -> Self {
        Self {
            sanitizer: Sanitizer::new(),
            policy,
            proposer,
            executor,
            audit,
        }
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    /// Run one mediation cycle and record it.
    ///
    /// Never fails. Collaborator faults end up in the returned event and an
    /// audit sink failure is only logged.
    pub async fn mediate(
        &self,
        case: &MediationCase,
        run_idx: u32,
        sanitization_enabled: bool,
    ) -> AuditEvent {
        let event = self.cycle(case, run_idx, sanitization_enabled).await;
        self.record(&event).await;
        event
    }

    /// Run every case `runs` times (run indices start at 1).
    ///
    /// Up to `concurrency` cycles are in flight at once. Events are recorded
    /// and returned in run-then-case order whatever order they finish in.
    pub async fn run_suite(
        &self,
        cases: &[MediationCase],
        runs: u32,
        sanitization_enabled: bool,
        concurrency: usize,
    ) -> Vec<AuditEvent> {
        let jobs = (1..=runs).flat_map(|run_idx| cases.iter().map(move |case| (run_idx, case)));

        let mut cycles = stream::iter(jobs)
            .map(|(run_idx, case)| self.cycle(case, run_idx, sanitization_enabled))
            .buffered(concurrency.max(1));

        let mut events = Vec::with_capacity(cases.len() * runs as usize);
        while let Some(event) = cycles.next().await {
            self.record(&event).await;
            events.push(event);
        }

        tracing::info!(
            runs,
            cases = cases.len(),
            events = events.len(),
            sanitization_enabled,
            "Suite complete"
        );
        events
    }

    async fn cycle(&self, case: &MediationCase, run_idx: u32, sanitization_enabled: bool) -> AuditEvent {
        let sanitized = if sanitization_enabled {
            self.sanitizer.sanitize(&case.untrusted_context)
        } else {
            SanitizationResult::passthrough(case.untrusted_context.as_str())
        };

        if sanitized.hits > 0 {
            tracing::debug!(
                case_id = %case.case_id,
                run_idx,
                hits = sanitized.hits,
                "Untrusted context sanitized"
            );
        }

        let builder = AuditEvent::builder(case.case_id.as_str(), run_idx)
            .user_input(case.user_input.as_str())
            .untrusted(
                case.untrusted_context.as_str(),
                sanitized.text.as_str(),
                sanitization_enabled,
                sanitized.hits,
            );

        let proposed = AssertUnwindSafe(self.proposer.propose(&case.user_input, &sanitized.text))
            .catch_unwind()
            .await;
        let proposal = match proposed {
            Ok(Ok(proposal)) => proposal,
            Ok(Err(e)) => {
                tracing::warn!(case_id = %case.case_id, run_idx, error = %e, "Proposer failed");
                return builder.error(format!("proposer failed: {}", e)).build();
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                tracing::warn!(
                    case_id = %case.case_id,
                    run_idx,
                    error = %msg,
                    "Proposer panicked"
                );
                return builder.error(format!("proposer panicked: {}", msg)).build();
            }
        };

        let builder = builder.proposer_message(proposal.message);
        let event = match proposal.action {
            Some(action) => {
                let meta = ContextMeta {
                    case_id: case.case_id.clone(),
                    run_idx,
                };
                builder.tool_call(self.dispatch(action, &meta).await).build()
            }
            None => builder.build(),
        };

        tracing::info!(
            case_id = %event.case_id,
            run_idx,
            hits = event.sanitizer_hits,
            tool = event.tool_call.as_ref().map(|tc| tc.action.tool.as_str()),
            allowed = event.allowed(),
            "Mediation cycle complete"
        );
        event
    }

    /// Vet the action and execute it only on a permit.
    async fn dispatch(&self, action: ProposedAction, meta: &ContextMeta) -> ToolCallRecord {
        let decision = self.policy.check(&action, meta);
        if !decision.allowed {
            return ToolCallRecord::blocked(action, decision);
        }

        // Permit implies an allowlisted kind
        let kind = match action.kind() {
            Ok(kind) => kind,
            Err(e) => {
                let result = json!({ "status": "error", "error": e.to_string() });
                return ToolCallRecord::executed(action, decision, result);
            }
        };

        let executed = AssertUnwindSafe(self.executor.execute(kind, &action.args))
            .catch_unwind()
            .await;
        let result = match executed {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(
                    case_id = %meta.case_id,
                    run_idx = meta.run_idx,
                    tool = %kind,
                    error = %e,
                    "Executor failed"
                );
                json!({ "status": "error", "error": e.to_string() })
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                tracing::warn!(
                    case_id = %meta.case_id,
                    run_idx = meta.run_idx,
                    tool = %kind,
                    error = %msg,
                    "Executor panicked"
                );
                json!({ "status": "error", "error": format!("executor panicked: {}", msg) })
            }
        };
        ToolCallRecord::executed(action, decision, result)
    }

    async fn record(&self, event: &AuditEvent) {
        if let Err(e) = self.audit.log(event).await {
            tracing::warn!(
                case_id = %event.case_id,
                run_idx = event.run_idx,
                error = %e,
                "Failed to write audit event"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
