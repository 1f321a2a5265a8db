//! Mission planning client.
//!
//! Converts a relative mission duration into the Julian Date the planning service expects,
//! asks the service whether the mission is feasible, and only lets a launch through once an
//! assessment has approved it. The CLI in `main.rs` is one front end; anything that can send
//! [`orchestrator::SessionCommand`]s and read [`model::WorkflowEvent`]s can drive it.

pub mod cli;
pub mod engine;
pub mod epoch;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod storage;
mod text_summary;
