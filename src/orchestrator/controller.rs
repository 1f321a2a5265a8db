//! Session loop.
//!
//! Feeds commands from a presentation layer into one [`WorkflowController`], strictly one at a
//! time, so a launch queued behind a feasibility check only runs once that check has settled.

use super::workflow::{WorkflowController, WorkflowState};
use crate::engine::PlanningService;
use crate::model::MissionParameters;
use tokio::sync::mpsc::UnboundedReceiver;

/// Commands emitted by UI layers to drive the workflow.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Check(MissionParameters),
    Launch(MissionParameters),
    Reset,
    Quit,
}

/// Run commands until `Quit` or until every sender is gone, then hand back the final state.
///
/// The controller (and with it the event sender) is dropped on return, which closes the
/// event stream for consumers.
pub async fn run_session<S: PlanningService>(
    mut controller: WorkflowController<S>,
    mut cmd_rx: UnboundedReceiver<SessionCommand>,
) -> WorkflowState {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SessionCommand::Check(params) => {
                controller.check_feasibility(&params).await;
            }
            SessionCommand::Launch(params) => {
                controller.launch(&params).await;
            }
            SessionCommand::Reset => controller.reset(),
            SessionCommand::Quit => break,
        }
    }
    tracing::debug!(phase = ?controller.phase(), "session ended");
    controller.into_state()
}
