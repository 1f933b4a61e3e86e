//! CLI command implementations for the mediator.

pub mod check_action;
pub mod kb;
pub mod run;
pub mod sanitize;
pub mod summarize;
