//! JSON export of session reports.

use crate::model::SessionReport;
use anyhow::{Context, Result};
use std::path::Path;

/// Write `report` as pretty JSON to `path`, creating parent directories as needed.
pub fn export_json(path: &Path, report: &SessionReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(report).context("serialize session report")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
