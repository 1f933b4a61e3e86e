//! End-to-end runs of the built-in suite through the full pipeline.

use mediator_audit::{AuditLogger, Disposition, Mode, summarize};
use mediator_core::{AuditConfig, AuditEvent, MediationCase, PolicyRule};
use mediator_policy::PolicyEngine;
use mediator_runtime::{Orchestrator, ScriptedProposer, SimulatedExecutor, builtin_cases};
use std::sync::Arc;

fn orchestrator(audit: Arc<AuditLogger>) -> Orchestrator<ScriptedProposer, SimulatedExecutor> {
    Orchestrator::new(
        PolicyEngine::new(["axa.com", "example.com"]),
        ScriptedProposer::new(),
        SimulatedExecutor::new(),
        audit,
    )
}

fn case(id: &str) -> MediationCase {
    builtin_cases()
        .into_iter()
        .find(|c| c.case_id == id)
        .expect("builtin case")
}

async fn mediate(id: &str, sanitize: bool) -> AuditEvent {
    orchestrator(Arc::new(AuditLogger::in_memory()))
        .mediate(&case(id), 1, sanitize)
        .await
}

#[tokio::test]
async fn test_prompt_injection_is_blocked_by_domain_rule() {
    let event = mediate("A_prompt_injection", true).await;

    let tool_call = event.tool_call.expect("proposer acts on the injection");
    assert_eq!(tool_call.action.tool, "send_email");
    assert_eq!(tool_call.action.arg_str("to"), "attacker@evil.com");
    assert!(!tool_call.decision.allowed);
    assert_eq!(tool_call.decision.rule, Some(PolicyRule::EmailDomain));
    assert!(tool_call.decision.reason.contains("email domain not permitted"));
    assert_eq!(tool_call.result["status"], "blocked");
    assert_eq!(tool_call.result["reason"], tool_call.decision.reason.as_str());
}

#[tokio::test]
async fn test_retrieved_injection_is_prevented_by_sanitizer() {
    let event = mediate("B_rag_injection", true).await;

    assert!(event.sanitizer_hits >= 1);
    assert!(!event.untrusted_used.contains("send_email"));
    assert!(event.untrusted_used.contains("[REDACTED_INSTRUCTION]"));
    assert!(event.tool_call.is_none());
    assert!(event.is_prevented());
}

#[tokio::test]
async fn test_retrieved_injection_without_sanitizer_reaches_policy() {
    let event = mediate("B_rag_injection", false).await;

    assert_eq!(event.sanitizer_hits, 0);
    assert_eq!(event.untrusted_used, event.untrusted_raw);
    assert!(!event.is_prevented());
    let tool_call = event
        .tool_call
        .as_ref()
        .expect("unsanitized context drives the proposer");
    assert!(!tool_call.decision.allowed);
    assert_eq!(tool_call.decision.rule, Some(PolicyRule::EmailDomain));
}

#[tokio::test]
async fn test_sql_injection_is_blocked() {
    let event = mediate("C_sql_injection", true).await;

    let tool_call = event.tool_call.unwrap();
    assert_eq!(tool_call.action.tool, "db_query");
    assert!(!tool_call.decision.allowed);
    assert_eq!(tool_call.decision.rule, Some(PolicyRule::QueryInjection));
}

#[tokio::test]
async fn test_legitimate_email_is_sent() {
    let event = mediate("D_legit_email", true).await;

    let tool_call = event.tool_call.unwrap();
    assert!(tool_call.decision.allowed);
    assert_eq!(tool_call.decision.rule, None);
    assert_eq!(tool_call.result["status"], "sent(simulated)");
    assert_eq!(tool_call.result["to"], "ops@example.com");
}

#[tokio::test]
async fn test_suite_summary_with_sanitizer() {
    let audit = Arc::new(AuditLogger::in_memory());
    let events = orchestrator(audit.clone())
        .run_suite(&builtin_cases(), 2, true, 4)
        .await;

    let report = summarize(&events);
    assert_eq!(report.mode, Mode::Sanitized);
    assert_eq!(report.runs, 2);
    assert_eq!(report.total_events, 8);
    assert_eq!(report.tool_calls, 6);
    assert_eq!(report.allowed, 2);
    assert_eq!(report.blocked, 4);
    assert_eq!(report.prevented, 2);

    let dispositions: Vec<Disposition> = report.cases.iter().map(|c| c.disposition).collect();
    assert_eq!(
        dispositions,
        vec![
            Disposition::Blocked,
            Disposition::Prevented,
            Disposition::Blocked,
            Disposition::Permitted,
        ]
    );

    // The sink sees the same sequence
    assert_eq!(summarize(&audit.events().await.unwrap()), report);
}

#[tokio::test]
async fn test_suite_summary_without_sanitizer() {
    let events = orchestrator(Arc::new(AuditLogger::in_memory()))
        .run_suite(&builtin_cases(), 1, false, 1)
        .await;

    let report = summarize(&events);
    assert_eq!(report.mode, Mode::Unsanitized);
    assert_eq!(report.tool_calls, 4);
    assert_eq!(report.blocked, 3);
    assert_eq!(report.allowed, 1);
    assert_eq!(report.prevented, 0);
}

#[tokio::test]
async fn test_file_log_matches_returned_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuditConfig {
        directory: dir.path().to_path_buf(),
        ..Default::default()
    };
    let audit = Arc::new(AuditLogger::new(&config, "run_rag_filter").unwrap());
    let events = orchestrator(audit)
        .run_suite(&builtin_cases(), 1, true, 2)
        .await;

    let logged = mediator_audit::read_log(config.log_path("run_rag_filter")).unwrap();
    assert_eq!(logged, events);
}
