//! Adapters for the remote planning service.
//!
//! The workflow is generic over [`PlanningService`] so it can run against the real HTTP
//! client or an in-process stand-in.

mod planning;

pub use planning::PlanningClient;

use crate::model::{FeasibilityRequest, FeasibilityResult, LaunchAck, LaunchRequest, MissionRecord};
use anyhow::Result;
use std::future::Future;

/// Remote endpoints the workflow talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Feasibility,
    Launch,
    History,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Feasibility => "feasibility",
            Endpoint::Launch => "launch",
            Endpoint::History => "history",
        }
    }
}

/// Contract consumed from the planning service.
///
/// Any transport problem (connection failure, non-success status, undecodable body) is an
/// `Err`; interpreting it is the caller's job.
pub trait PlanningService {
    fn check_feasibility(
        &self,
        request: &FeasibilityRequest,
    ) -> impl Future<Output = Result<FeasibilityResult>> + Send;

    fn launch(&self, request: &LaunchRequest) -> impl Future<Output = Result<LaunchAck>> + Send;

    fn past_missions(&self) -> impl Future<Output = Result<Vec<MissionRecord>>> + Send;

    /// Human-readable location of an endpoint, for progress messages.
    fn describe(&self, endpoint: Endpoint) -> String {
        endpoint.as_str().to_string()
    }
}
