//! Feasibility-gated launch workflow.
//!
//! A launch may only be sent while the controller holds an assessment with
//! `feasible = true`. Remote failures never escape: they settle into a non-approved
//! assessment (feasibility) or back into the resolved phase (launch).

use crate::engine::{Endpoint, PlanningService};
use crate::epoch;
use crate::model::{
    FeasibilityOutcome, FeasibilityRequest, FeasibilityResult, InfoEvent, LaunchOutcome,
    LaunchRequest, MissionParameters, WorkflowEvent, WorkflowPhase,
};
use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedSender;

/// Settled feasibility check: the epoch it was computed for and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub epoch: f64,
    pub outcome: FeasibilityOutcome,
}

/// Workflow state with the phase as discriminant.
///
/// Approval is derived from the held outcome, so "approved while idle" cannot be expressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Analyzing,
    Resolved(Resolution),
    Launching(Resolution),
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Idle => WorkflowPhase::Idle,
            WorkflowState::Analyzing => WorkflowPhase::Analyzing,
            WorkflowState::Resolved(_) => WorkflowPhase::Resolved,
            WorkflowState::Launching(_) => WorkflowPhase::Launching,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            WorkflowState::Resolved(r) | WorkflowState::Launching(r) => Some(r),
            WorkflowState::Idle | WorkflowState::Analyzing => None,
        }
    }

    pub fn last_result(&self) -> Option<&FeasibilityResult> {
        self.resolution().map(|r| r.outcome.result())
    }

    pub fn is_approved(&self) -> bool {
        self.resolution()
            .map(|r| r.outcome.is_approved())
            .unwrap_or(false)
    }
}

/// Owns the workflow state for one planning session.
pub struct WorkflowController<S> {
    service: S,
    state: WorkflowState,
    visualization_route: String,
    event_tx: Option<UnboundedSender<WorkflowEvent>>,
}

impl<S: PlanningService> WorkflowController<S> {
    pub fn new(
        service: S,
        visualization_route: impl Into<String>,
        event_tx: Option<UnboundedSender<WorkflowEvent>>,
    ) -> Self {
        Self {
            service,
            state: WorkflowState::Idle,
            visualization_route: visualization_route.into(),
            event_tx,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    pub fn is_approved(&self) -> bool {
        self.state.is_approved()
    }

    pub fn last_result(&self) -> Option<&FeasibilityResult> {
        self.state.last_result()
    }

    pub fn into_state(self) -> WorkflowState {
        self.state
    }

    /// Assess `params` with the intercept placed `duration_days` after the current time.
    pub async fn check_feasibility(&mut self, params: &MissionParameters) -> FeasibilityOutcome {
        self.check_feasibility_at(OffsetDateTime::now_utc(), params)
            .await
    }

    /// Assess `params` with the intercept placed `duration_days` after `now`.
    ///
    /// Always settles in [`WorkflowState::Resolved`]. A transport failure becomes
    /// [`FeasibilityOutcome::Unreachable`], which is never approved.
    pub async fn check_feasibility_at(
        &mut self,
        now: OffsetDateTime,
        params: &MissionParameters,
    ) -> FeasibilityOutcome {
        // With `&mut self` no other call can be in flight; a busy phase here was left by a
        // future that was dropped before it settled.
        if matches!(
            self.state,
            WorkflowState::Analyzing | WorkflowState::Launching(_)
        ) {
            tracing::warn!(
                phase = ?self.state.phase(),
                "discarding state of an abandoned request"
            );
        }
        self.transition(WorkflowState::Analyzing);

        let epoch = epoch::intercept_epoch(now, params.duration_days);
        let request = FeasibilityRequest::new(params, epoch);
        self.emit(WorkflowEvent::Info(InfoEvent::Requesting {
            endpoint: self.service.describe(Endpoint::Feasibility),
        }));
        tracing::debug!(
            target_name = %params.target,
            intercept_epoch = epoch,
            swarm_size = params.swarm_size,
            "requesting feasibility assessment"
        );

        let outcome = match self.service.check_feasibility(&request).await {
            Ok(result) => {
                tracing::info!(
                    feasible = result.feasible,
                    success_probability = result.success_probability,
                    "feasibility assessment received"
                );
                FeasibilityOutcome::Assessed(result)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "feasibility check failed");
                FeasibilityOutcome::unreachable(format!("{e:#}"))
            }
        };

        self.transition(WorkflowState::Resolved(Resolution {
            epoch,
            outcome: outcome.clone(),
        }));
        self.emit(WorkflowEvent::FeasibilityResolved {
            epoch,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Send the launch request for an approved assessment.
    ///
    /// Without approval this is a no-op returning [`LaunchOutcome::NotApproved`]. On success
    /// the workflow resets to idle and asks the presentation layer to open the mission
    /// visualization; on failure it returns to the resolved phase so the launch can be retried.
    pub async fn launch(&mut self, params: &MissionParameters) -> LaunchOutcome {
        let resolution = match &self.state {
            WorkflowState::Resolved(res) if res.outcome.is_approved() => res.clone(),
            other => {
                tracing::debug!(phase = ?other.phase(), "launch refused: no approved assessment");
                self.emit(WorkflowEvent::Info(InfoEvent::LaunchRefused));
                return LaunchOutcome::NotApproved;
            }
        };

        let request = LaunchRequest::build(params, Some(resolution.outcome.result()));
        self.transition(WorkflowState::Launching(resolution));
        self.emit(WorkflowEvent::Info(InfoEvent::Requesting {
            endpoint: self.service.describe(Endpoint::Launch),
        }));

        match self.service.launch(&request).await {
            Ok(ack) => {
                tracing::info!(mission_id = ?ack.id, "launch accepted");
                self.emit(WorkflowEvent::LaunchAccepted { ack: ack.clone() });
                self.reset();
                self.emit(WorkflowEvent::OpenView {
                    route: self.visualization_route.clone(),
                });
                LaunchOutcome::Launched(ack)
            }
            Err(e) => {
                let cause = format!("{e:#}");
                tracing::warn!(error = %cause, "launch failed; assessment kept for retry");
                if let WorkflowState::Launching(res) = &self.state {
                    let res = res.clone();
                    self.transition(WorkflowState::Resolved(res));
                }
                self.emit(WorkflowEvent::LaunchFailed {
                    cause: cause.clone(),
                });
                LaunchOutcome::Failed { cause }
            }
        }
    }

    /// Drop any assessment and return to idle, whatever the current phase.
    pub fn reset(&mut self) {
        self.transition(WorkflowState::Idle);
    }

    fn transition(&mut self, next: WorkflowState) {
        let from = self.state.phase();
        let to = next.phase();
        self.state = next;
        if from != to {
            tracing::debug!(?from, ?to, "workflow phase changed");
            self.emit(WorkflowEvent::PhaseChanged { phase: to });
        }
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}
