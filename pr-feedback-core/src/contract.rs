//! # contract: interface to the source-control host
//!
//! This module defines a single trait ([`GitHubApi`]) and the plain data types that
//! flow through it: the issue-comment calls used by the comment upserter and the
//! check-run calls used by the check reporter.
//!
//! ## Interface & Extensibility
//! - Implement [`GitHubApi`] to talk to a real host (see the `pr-feedback` binary crate).
//! - All methods are async and return the boxed [`ApiError`], so implementors are free
//!   to surface their own transport error types.
//! - Request types serialize directly to the host's REST payloads.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockGitHubApi` is exported under the
//!   default `test-export-mocks` feature so integration tests can script responses.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[allow(unused_imports)]
use mockall::{automock, predicate::*};

use crate::annotation::Annotation;

/// Error returned by every [`GitHubApi`] call.
pub type ApiError = Box<dyn std::error::Error + Send + Sync>;

/// Repository coordinates on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/name`. Both halves must be non-empty.
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An issue or pull request comment as returned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// One page of issue comments, in the host's ascending order.
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    /// Page number to request next, or `None` when this was the last page.
    pub next_page: Option<u32>,
}

/// Final disposition of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conclusion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Conclusion::Success),
            "failure" => Ok(Conclusion::Failure),
            "cancelled" => Ok(Conclusion::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    InProgress,
    Completed,
}

/// The `output` object of a check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutput {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// Payload for creating a check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCheckRun {
    pub name: String,
    pub head_sha: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Conclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<CheckOutput>,
}

/// Payload for updating an existing check run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRunUpdate {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Conclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub output: CheckOutput,
}

/// A check run as returned by the host after create/update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Trait for the host calls consumed by the comment upserter and the check reporter.
///
/// The trait is implemented by the real REST client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetch one page (1-based) of comments on an issue or pull request.
    async fn list_comments(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        page: u32,
    ) -> Result<CommentPage, ApiError>;

    /// Create a new comment on an issue or pull request.
    async fn create_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, ApiError>;

    /// Replace the body of an existing comment.
    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, ApiError>;

    /// Create a check run on a commit.
    async fn create_check_run(&self, repo: &RepoRef, check: NewCheckRun)
        -> Result<CheckRun, ApiError>;

    /// Update a check run; annotations in `update.output` are appended by the host.
    async fn update_check_run(
        &self,
        repo: &RepoRef,
        check_run_id: u64,
        update: CheckRunUpdate,
    ) -> Result<CheckRun, ApiError>;
}
