//! Loading ordered action plans from disk.
//!
//! Each step is an [`ActionRequest`]. A key with a null value is an unset
//! entry, so a bare YAML key such as `- list_running_apps:` is an empty step
//! and runs nothing. Actions without parameters are written with an empty
//! mapping: `- list_running_apps: {}`.

use crate::types::ActionRequest;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Parse a plan: a JSON array or YAML sequence of action requests.
pub fn parse_plan(content: &str, format_hint: Option<&str>) -> Result<Vec<ActionRequest>> {
    match format_hint {
        Some("json") => serde_json::from_str(content).context("Failed to parse JSON plan"),
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(content).context("Failed to parse YAML plan")
        }
        _ => serde_json::from_str(content).or_else(|json_err| {
            serde_yaml::from_str(content).with_context(|| {
                format!("Plan is neither valid JSON ({json_err}) nor valid YAML")
            })
        }),
    }
}

/// Read a plan file, picking the format from its extension.
pub fn load_plan(path: impl AsRef<Path>) -> Result<Vec<ActionRequest>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let plan = parse_plan(&content, extension.as_deref())
        .with_context(|| format!("Invalid plan in {}", path.display()))?;
    debug!("Loaded {} action(s) from {}", plan.len(), path.display());
    Ok(plan)
}
