//! Text summary builders for CLI output.

use crate::metrics;
use crate::model::{FeasibilityOutcome, LaunchOutcome, MissionParameters, MissionRecord};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn build_parameters_summary(params: &MissionParameters) -> TextSummary {
    TextSummary {
        lines: vec![format!(
            "Mission: {} in {} days, {} units, {:.2} km/s budget, {:.1}° angle, {} roles, {} propulsion",
            params.target,
            params.duration_days,
            params.swarm_size,
            params.delta_v_budget,
            params.target_angle_deg,
            params.role_split,
            params.propulsion_type
        )],
    }
}

pub(crate) fn build_feasibility_summary(epoch: f64, outcome: &FeasibilityOutcome) -> TextSummary {
    let mut lines = Vec::new();
    let r = outcome.result();

    lines.push(format!("Intercept epoch: JD {epoch:.5}"));
    let verdict = match outcome {
        FeasibilityOutcome::Assessed(r) if r.feasible => "APPROVED",
        FeasibilityOutcome::Assessed(_) => "REJECTED",
        FeasibilityOutcome::Unreachable { .. } => "UNAVAILABLE",
    };
    lines.push(format!("Feasibility: {verdict}"));
    lines.push(format!("Reason: {}", r.reason));
    if let FeasibilityOutcome::Assessed(r) = outcome {
        lines.push(format!(
            "Success probability: {:.1}%  Delta-v: {:.2} km/s  Time of flight: {:.0} days  Fuel: {:.1} kg",
            r.success_probability * 100.0,
            r.delta_v,
            r.time_of_flight,
            r.fuel_required
        ));
    }

    TextSummary { lines }
}

pub(crate) fn build_launch_summary(outcome: &LaunchOutcome) -> TextSummary {
    let mut lines = Vec::new();
    match outcome {
        LaunchOutcome::Launched(ack) => {
            lines.push(
                ack.message
                    .clone()
                    .unwrap_or_else(|| "Launch accepted by mission control".to_string()),
            );
            if let Some(id) = ack.id.as_deref() {
                let saved = match ack.mission_saved {
                    Some(true) => " (saved to history)",
                    Some(false) => " (not saved to history)",
                    None => "",
                };
                lines.push(format!("Mission id: {id}{saved}"));
            }
        }
        LaunchOutcome::NotApproved => {
            lines.push("Launch skipped: mission not approved".to_string());
        }
        LaunchOutcome::Failed { cause } => {
            lines.push(format!("Launch failed, assessment kept for retry: {cause}"));
        }
    }
    TextSummary { lines }
}

/// Mission history listing, followed by aggregate statistics when there is enough data.
pub(crate) fn build_history_summary(records: &[MissionRecord]) -> TextSummary {
    let mut lines = Vec::new();
    if records.is_empty() {
        lines.push("No past missions".to_string());
        return TextSummary { lines };
    }

    for m in records {
        lines.push(format!(
            "{}  {:<24} {:>10}  swarm {:>4}  dv {:>6}  {:>6} days  p {:>6}  {}",
            m.id,
            m.name.as_deref().unwrap_or("-"),
            m.date.as_deref().unwrap_or("-"),
            m.swarm_count
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into()),
            fmt_opt(m.delta_v, 2),
            fmt_opt(m.duration, 0),
            m.success_probability
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "-".into()),
            m.status.as_deref().unwrap_or("-"),
        ));
    }

    let probabilities: Vec<f64> = records.iter().filter_map(|m| m.success_probability).collect();
    if let Some((mean, median, p25, p75)) = metrics::compute_metrics(&probabilities) {
        lines.push(format!(
            "Success probability: avg {:.1}% med {:.1}% p25 {:.1}% p75 {:.1}%",
            mean * 100.0,
            median * 100.0,
            p25 * 100.0,
            p75 * 100.0
        ));
    }
    let delta_vs: Vec<f64> = records.iter().filter_map(|m| m.delta_v).collect();
    if let Some((mean, median, p25, p75)) = metrics::compute_metrics(&delta_vs) {
        lines.push(format!(
            "Delta-v: avg {:.2} med {:.2} p25 {:.2} p75 {:.2} km/s",
            mean, median, p25, p75
        ));
    }
    lines.push(format!("{} missions", records.len()));

    TextSummary { lines }
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".into())
}
