use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Message used in place of a real assessment when the planning service cannot be reached.
pub const SERVICE_UNREACHABLE_REASON: &str =
    "Failed to connect to mission control systems. Please try again.";

/// Reason substituted when the service answers without an explanation.
pub const MISSING_REASON: &str = "Mission control returned no explanation.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub base_url: String,
    pub feasibility_path: String,
    pub launch_path: String,
    pub history_path: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    /// View the presentation layer is asked to open after a successful launch.
    pub visualization_route: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            feasibility_path: "/api/check-feasibility".into(),
            launch_path: "/api/launch-mission".into(),
            history_path: "/api/past-missions".into(),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("mission-planner/{}", env!("CARGO_PKG_VERSION")),
            visualization_route: "/solarsystem".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Target {
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Venus,
    Mercury,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Earth => "Earth",
            Target::Mars => "Mars",
            Target::Jupiter => "Jupiter",
            Target::Saturn => "Saturn",
            Target::Venus => "Venus",
            Target::Mercury => "Mercury",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the swarm's units divide science, communication, and support duties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RoleSplit {
    Equal,
    ScienceHeavy,
    CommHeavy,
    Specialized,
}

impl RoleSplit {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleSplit::Equal => "equal",
            RoleSplit::ScienceHeavy => "science-heavy",
            RoleSplit::CommHeavy => "comm-heavy",
            RoleSplit::Specialized => "specialized",
        }
    }
}

impl fmt::Display for RoleSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PropulsionType {
    Chemical,
    Ion,
    Nuclear,
}

impl PropulsionType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropulsionType::Chemical => "chemical",
            PropulsionType::Ion => "ion",
            PropulsionType::Nuclear => "nuclear",
        }
    }
}

impl fmt::Display for PropulsionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-entered mission scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionParameters {
    pub target: Target,
    pub duration_days: u32,
    pub swarm_size: u32,
    /// km/s
    pub delta_v_budget: f64,
    pub target_angle_deg: f64,
    pub role_split: RoleSplit,
    pub propulsion_type: PropulsionType,
}

impl Default for MissionParameters {
    fn default() -> Self {
        Self {
            target: Target::Earth,
            duration_days: 30,
            swarm_size: 12,
            delta_v_budget: 0.8,
            target_angle_deg: 45.0,
            role_split: RoleSplit::Equal,
            propulsion_type: PropulsionType::Chemical,
        }
    }
}

impl MissionParameters {
    /// Reject values outside their declared domains.
    ///
    /// The workflow controller trusts its input; front ends call this before handing
    /// parameters over.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.duration_days == 0 {
            anyhow::bail!("mission duration must be at least 1 day");
        }
        if self.swarm_size == 0 {
            anyhow::bail!("swarm size must be at least 1");
        }
        if !self.delta_v_budget.is_finite() || self.delta_v_budget < 0.0 {
            anyhow::bail!(
                "delta-v budget must be a non-negative number of km/s (got {})",
                self.delta_v_budget
            );
        }
        if !self.target_angle_deg.is_finite() {
            anyhow::bail!("target angle must be a finite number of degrees");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityRequest {
    pub target_name: Target,
    /// Julian Date of the planned intercept.
    pub intercept_epoch: f64,
    pub swarm_size: u32,
    pub role_split: RoleSplit,
    pub propulsion_type: PropulsionType,
}

impl FeasibilityRequest {
    pub fn new(params: &MissionParameters, intercept_epoch: f64) -> Self {
        Self {
            target_name: params.target,
            intercept_epoch,
            swarm_size: params.swarm_size,
            role_split: params.role_split,
            propulsion_type: params.propulsion_type,
        }
    }
}

/// Assessment returned by the planning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFeasibilityResult")]
pub struct FeasibilityResult {
    pub feasible: bool,
    pub reason: String,
    pub success_probability: f64,
    /// km/s
    pub delta_v: f64,
    /// days
    pub time_of_flight: f64,
    /// kg
    pub fuel_required: f64,
}

impl FeasibilityResult {
    /// Synthetic rejection standing in for an assessment that never arrived.
    pub fn unreachable() -> Self {
        Self {
            feasible: false,
            reason: SERVICE_UNREACHABLE_REASON.to_string(),
            success_probability: 0.0,
            delta_v: 0.0,
            time_of_flight: 0.0,
            fuel_required: 0.0,
        }
    }
}

// Wire shape with every field optional; partial answers decode as a non-approval.
#[derive(Deserialize)]
struct RawFeasibilityResult {
    feasible: Option<bool>,
    reason: Option<String>,
    success_probability: Option<f64>,
    delta_v: Option<f64>,
    time_of_flight: Option<f64>,
    fuel_required: Option<f64>,
}

impl From<RawFeasibilityResult> for FeasibilityResult {
    fn from(raw: RawFeasibilityResult) -> Self {
        Self {
            feasible: raw.feasible.unwrap_or(false),
            reason: raw
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| MISSING_REASON.to_string()),
            success_probability: raw.success_probability.unwrap_or(0.0),
            delta_v: raw.delta_v.unwrap_or(0.0),
            time_of_flight: raw.time_of_flight.unwrap_or(0.0),
            fuel_required: raw.fuel_required.unwrap_or(0.0),
        }
    }
}

/// Result of a feasibility check as seen by the workflow.
///
/// Keeps "the service said no" apart from "the service never answered" so callers do not
/// have to compare reason strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeasibilityOutcome {
    Assessed(FeasibilityResult),
    Unreachable {
        cause: String,
        result: FeasibilityResult,
    },
}

impl FeasibilityOutcome {
    pub fn unreachable(cause: impl Into<String>) -> Self {
        FeasibilityOutcome::Unreachable {
            cause: cause.into(),
            result: FeasibilityResult::unreachable(),
        }
    }

    /// The assessment to display, synthetic when the service was unreachable.
    pub fn result(&self) -> &FeasibilityResult {
        match self {
            FeasibilityOutcome::Assessed(r) => r,
            FeasibilityOutcome::Unreachable { result, .. } => result,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, FeasibilityOutcome::Assessed(r) if r.feasible)
    }
}

/// Success probability sent with a launch when no assessment supplies one.
pub const FALLBACK_SUCCESS_PROBABILITY: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub target: Target,
    pub days: u32,
    pub swarm_count: u32,
    pub delta_v_budget: f64,
    pub target_angle_deg: f64,
    pub success_probability: f64,
    pub time_of_flight: f64,
}

impl LaunchRequest {
    /// Build the launch body. Without an assessment the probability falls back to
    /// [`FALLBACK_SUCCESS_PROBABILITY`] and the time of flight to the mission duration.
    pub fn build(params: &MissionParameters, assessment: Option<&FeasibilityResult>) -> Self {
        Self {
            target: params.target,
            days: params.duration_days,
            swarm_count: params.swarm_size,
            delta_v_budget: params.delta_v_budget,
            target_angle_deg: params.target_angle_deg,
            success_probability: assessment
                .map(|r| r.success_probability)
                .unwrap_or(FALLBACK_SUCCESS_PROBABILITY),
            time_of_flight: assessment
                .map(|r| r.time_of_flight)
                .unwrap_or(params.duration_days as f64),
        }
    }
}

/// Acknowledgement returned by the launch endpoint. Every field is optional; only the
/// HTTP status decides success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mission_saved: Option<bool>,
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Launched(LaunchAck),
    /// Refused locally because no approved assessment is held; nothing was sent.
    NotApproved,
    Failed { cause: String },
}

/// Entry of the planning service's mission history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub swarm_count: Option<u32>,
    #[serde(default)]
    pub delta_v: Option<f64>,
    /// days
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub success_probability: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MissionHistory {
    #[serde(default)]
    pub missions: Vec<MissionRecord>,
}

/// Phase discriminant of the workflow, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowPhase {
    Idle,
    Analyzing,
    Resolved,
    Launching,
}

/// Events emitted by the workflow for presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    PhaseChanged {
        phase: WorkflowPhase,
    },
    FeasibilityResolved {
        epoch: f64,
        outcome: FeasibilityOutcome,
    },
    LaunchAccepted {
        ack: LaunchAck,
    },
    LaunchFailed {
        cause: String,
    },
    /// Ask the presentation layer to open a named view.
    OpenView {
        route: String,
    },
    Info(InfoEvent),
}

/// Structured info events consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Requesting { endpoint: String },
    LaunchRefused,
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Requesting { endpoint } => format!("Contacting mission control: {endpoint}"),
            InfoEvent::LaunchRefused => {
                "Launch refused: mission has not been approved by a feasibility check".to_string()
            }
        }
    }
}

/// Everything a single planning session produced, for JSON output and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub timestamp_utc: String,
    pub base_url: String,
    pub parameters: MissionParameters,
    #[serde(default)]
    pub intercept_epoch: Option<f64>,
    #[serde(default)]
    pub feasibility: Option<FeasibilityOutcome>,
    #[serde(default)]
    pub launch: Option<LaunchOutcome>,
}
