//! # mediator-runtime
//!
//! The mediation cycle: sanitize untrusted context, ask the proposer for an
//! action, vet it with the policy engine, execute it only on a permit, and
//! append the outcome to the audit trail.
//!
//! The proposer and executor are collaborators behind traits. Nothing in the
//! cycle trusts the proposer to police itself.

pub mod collaborators;
pub mod error;
pub mod knowledge;
pub mod orchestrator;
pub mod simulated;
pub mod suite;

pub use collaborators::{Executor, Proposer};
pub use error::RuntimeError;
pub use knowledge::{Document, KnowledgeBase};
pub use orchestrator::Orchestrator;
pub use simulated::{ScriptedProposer, SimulatedExecutor};
pub use suite::{CaseDefinition, CaseFile, builtin_cases, load_cases};
