//! Workflow orchestration.
//!
//! `workflow` owns the feasibility/launch state machine and its approval gate; `controller`
//! drives it from a command channel for presentation layers.

mod controller;
mod workflow;

pub use controller::{run_session, SessionCommand};
pub use workflow::{Resolution, WorkflowController, WorkflowState};
