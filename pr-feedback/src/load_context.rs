/// `load_context` module: builds the [`ExecutionContext`] from the GitHub Actions runner environment.
///
/// This is the only place that reads `GITHUB_REPOSITORY`, `GITHUB_SHA` and the event
/// payload at `GITHUB_EVENT_PATH`. Everything downstream receives the resulting value
/// explicitly.
///
/// # Errors
/// A payload file that exists but cannot be read or parsed is an error. A missing
/// payload file only produces a warning, as on `workflow_dispatch` runs outside a
/// runner.
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pr_feedback_core::context::ExecutionContext;
use serde_json::Value;
use tracing::{info, warn};

pub fn load_context() -> Result<ExecutionContext> {
    let repository = env::var("GITHUB_REPOSITORY").ok();
    let sha = env::var("GITHUB_SHA").ok();
    let payload = match env::var("GITHUB_EVENT_PATH") {
        Ok(path) if !path.is_empty() => load_event_payload(Path::new(&path))?,
        _ => {
            warn!("GITHUB_EVENT_PATH not set, using an empty event payload");
            Value::Object(Default::default())
        }
    };

    let context = ExecutionContext::from_event(repository.as_deref(), sha.as_deref(), &payload);
    info!(
        repository = ?context.repository,
        issue_number = ?context.issue_number,
        pull_request_head_sha = ?context.pull_request_head_sha,
        sha = ?context.sha,
        "Loaded execution context"
    );
    Ok(context)
}

/// Reads the webhook event payload; a missing file yields an empty object.
pub fn load_event_payload(path: &Path) -> Result<Value> {
    if !path.exists() {
        warn!(event_path = %path.display(), "GITHUB_EVENT_PATH does not exist");
        return Ok(Value::Object(Default::default()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    let payload = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event payload {}", path.display()))?;
    info!(event_path = %path.display(), "Parsed event payload");
    Ok(payload)
}
