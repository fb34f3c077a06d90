use serde_json::Value;

use crate::contract::RepoRef;

/// What the CI runner knows about the current event.
///
/// Passed explicitly into [`crate::inputs::resolve`] so resolution never reaches for
/// process-wide state. The binary crate builds it from the runner environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub repository: Option<RepoRef>,
    pub issue_number: Option<u64>,
    pub pull_request_head_sha: Option<String>,
    pub sha: Option<String>,
}

impl ExecutionContext {
    /// Builds a context from an `owner/repo` slug, the triggering commit and the
    /// event payload.
    ///
    /// The issue number is taken from `issue.number`, then `pull_request.number`, then
    /// a top-level `number`, the same precedence the runner toolkit uses.
    pub fn from_event(repository: Option<&str>, sha: Option<&str>, payload: &Value) -> Self {
        let issue_number = ["issue", "pull_request"]
            .iter()
            .find_map(|key| payload.get(*key).filter(|v| !v.is_null()))
            .unwrap_or(payload)
            .get("number")
            .and_then(Value::as_u64);

        let pull_request_head_sha = payload
            .pointer("/pull_request/head/sha")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Self {
            repository: repository.and_then(RepoRef::parse),
            issue_number,
            pull_request_head_sha,
            sha: sha.filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }
}
