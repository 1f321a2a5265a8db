use crate::engine::{PlanningClient, PlanningService};
use crate::model::{
    InfoEvent, LaunchOutcome, MissionParameters, PlannerConfig, PropulsionType, RoleSplit,
    SessionReport, Target, WorkflowEvent,
};
use crate::orchestrator::{run_session, SessionCommand, WorkflowController};
use crate::text_summary;
use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "mission-planner",
    version,
    about = "Plan a swarm mission: feasibility check, then launch once approved"
)]
pub struct Cli {
    /// Base URL of the mission planning service
    #[arg(
        long,
        env = "MISSION_PLANNER_BASE_URL",
        default_value = "http://localhost:8000"
    )]
    pub base_url: String,

    /// Path of the feasibility endpoint, relative to the base URL
    #[arg(long, default_value = "/api/check-feasibility")]
    pub feasibility_path: String,

    /// Path of the launch endpoint, relative to the base URL
    #[arg(long, default_value = "/api/launch-mission")]
    pub launch_path: String,

    /// Path of the mission history endpoint, relative to the base URL
    #[arg(long, default_value = "/api/past-missions")]
    pub history_path: String,

    /// Timeout for each request to the planning service
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// View to open once a launch is accepted
    #[arg(long, default_value = "/solarsystem")]
    pub visualization_route: String,

    /// Mission target
    #[arg(long, value_enum, ignore_case = true, default_value = "earth")]
    pub target: Target,

    /// Mission duration in days from now
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Number of cooperating units in the swarm
    #[arg(long, default_value_t = 12)]
    pub swarms: u32,

    /// Delta-v budget in km/s
    #[arg(long, default_value_t = 0.8, allow_negative_numbers = true)]
    pub delta_v: f64,

    /// Target angle in degrees
    #[arg(long, default_value_t = 45.0, allow_negative_numbers = true)]
    pub angle: f64,

    /// Role distribution across the swarm
    #[arg(long, value_enum, default_value = "equal")]
    pub role_split: RoleSplit,

    /// Propulsion type
    #[arg(long, value_enum, default_value = "chemical")]
    pub propulsion: PropulsionType,

    /// Launch the mission if the feasibility check approves it
    #[arg(long)]
    pub launch: bool,

    /// List past missions and exit
    #[arg(long)]
    pub past_missions: bool,

    /// Print JSON result and exit
    #[arg(long)]
    pub json: bool,

    /// Print text summary and exit (default)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Export the session report as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.past_missions {
        return run_history(args).await;
    }
    run_plan(args).await
}

/// Generate a random identifier for the planning session.
fn gen_session_id() -> String {
    let mut b = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut b);
    u64::from_le_bytes(b).to_string()
}

/// Build a `PlannerConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> PlannerConfig {
    PlannerConfig {
        base_url: args.base_url.clone(),
        feasibility_path: args.feasibility_path.clone(),
        launch_path: args.launch_path.clone(),
        history_path: args.history_path.clone(),
        request_timeout: Duration::from(args.timeout),
        user_agent: format!("mission-planner/{}", env!("CARGO_PKG_VERSION")),
        visualization_route: args.visualization_route.clone(),
    }
}

/// Build `MissionParameters` from CLI arguments.
pub fn mission_params(args: &Cli) -> MissionParameters {
    MissionParameters {
        target: args.target,
        duration_days: args.days,
        swarm_size: args.swarms,
        delta_v_budget: args.delta_v,
        target_angle_deg: args.angle,
        role_split: args.role_split,
        propulsion_type: args.propulsion,
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

/// Run one planning session: assess, optionally launch, report.
async fn run_plan(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let params = mission_params(&args);
    params.validate().context("invalid mission parameters")?;

    let client = PlanningClient::new(&cfg)?;
    let session_id = gen_session_id();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<SessionCommand>();

    let controller = WorkflowController::new(client, cfg.visualization_route.clone(), Some(evt_tx));
    let span = tracing::info_span!("session", id = %session_id);
    let handle = tokio::spawn(run_session(controller, cmd_rx).instrument(span));

    // The session runs commands in order, so the launch only goes out once the
    // assessment has settled, and only if it was approved.
    cmd_tx
        .send(SessionCommand::Check(params.clone()))
        .context("session ended early")?;
    if args.launch {
        cmd_tx
            .send(SessionCommand::Launch(params.clone()))
            .context("session ended early")?;
    }
    cmd_tx.send(SessionCommand::Quit).ok();
    drop(cmd_tx);

    let (out_tx, out_handle) = spawn_output_writer();
    let text = !args.json;
    let mut report = SessionReport {
        session_id,
        timestamp_utc: now_rfc3339(),
        base_url: cfg.base_url.clone(),
        parameters: params.clone(),
        intercept_epoch: None,
        feasibility: None,
        launch: None,
    };

    if text {
        for line in text_summary::build_parameters_summary(&params).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    while let Some(ev) = evt_rx.recv().await {
        let launch = match ev {
            WorkflowEvent::PhaseChanged { phase } => {
                if text {
                    let _ = out_tx.send(OutputLine::Stderr(format!("== {phase:?} ==")));
                }
                None
            }
            WorkflowEvent::Info(InfoEvent::LaunchRefused) => Some(LaunchOutcome::NotApproved),
            WorkflowEvent::Info(info) => {
                if text {
                    let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
                }
                None
            }
            WorkflowEvent::FeasibilityResolved { epoch, outcome } => {
                if text {
                    for line in text_summary::build_feasibility_summary(epoch, &outcome).lines {
                        let _ = out_tx.send(OutputLine::Stdout(line));
                    }
                }
                report.intercept_epoch = Some(epoch);
                report.feasibility = Some(outcome);
                None
            }
            WorkflowEvent::LaunchAccepted { ack } => Some(LaunchOutcome::Launched(ack)),
            WorkflowEvent::LaunchFailed { cause } => Some(LaunchOutcome::Failed { cause }),
            WorkflowEvent::OpenView { route } => {
                if text {
                    let _ = out_tx.send(OutputLine::Stdout(format!(
                        "Open mission visualization: {route}"
                    )));
                }
                None
            }
        };
        if let Some(launch) = launch {
            if text {
                for line in text_summary::build_launch_summary(&launch).lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
            report.launch = Some(launch);
        }
    }

    handle.await.context("planning session task failed")?;

    if !text {
        let out = serde_json::to_string_pretty(&report)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    }

    let export = handle_exports(&args, &report);
    if let (Ok(()), Some(p), true) = (&export, args.export_json.as_deref(), text) {
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
    }

    drop(out_tx);
    let _ = out_handle.await;
    export
}

/// List the planning service's mission history.
async fn run_history(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let client = PlanningClient::new(&cfg)?;
    let missions = client
        .past_missions()
        .await
        .context("failed to load mission history")?;

    let (out_tx, out_handle) = spawn_output_writer();
    if args.json {
        let out = serde_json::to_string_pretty(&missions)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        for line in text_summary::build_history_summary(&missions).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Handle export operations for both text and JSON modes.
fn handle_exports(args: &Cli, report: &SessionReport) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, report)?;
    }
    Ok(())
}
