//! Error types.
//!
//! [`InputError`] covers configuration problems found before any network call.
//! [`PostError`] covers reading annotation files and every failed host call; each
//! variant carries the identifiers needed to find the failing resource.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::ApiError;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Mode {0} is not supported")]
    UnsupportedMode(String),

    #[error("Conclusion '{0}' is not a valid value of 'success', 'failure' or 'cancelled'.")]
    InvalidConclusion(String),

    #[error("Either \"file\" or \"message\" is required as input.")]
    MissingBodySource,

    #[error("Input \"prefix\" is required for mode '{0}'.")]
    MissingPrefix(String),

    #[error("Missing required input \"name\", \"title\", \"summary\" or \"conclusion\" for mode '{0}'.")]
    MissingCheckInputs(String),

    #[error("Failed to read body file '{}'", path.display())]
    ReadBody {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A body is required.")]
    EmptyBody,

    #[error("No repository could be resolved, set GITHUB_REPOSITORY to 'owner/repo'.")]
    MissingRepository,

    #[error("No issue/pull request in input neither in current context.")]
    MissingIssueNumber,

    #[error("No sha could be resolved.")]
    MissingSha,
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Failed to read file at path '{}'", path.display())]
    ReadAnnotations {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File at path '{}' is not a valid annotation list", path.display())]
    ParseAnnotations {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to open check '{name}'")]
    OpenCheck {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to update check '{check_id}' with chunk {chunk}")]
    UpdateCheck {
        check_id: u64,
        chunk: usize,
        #[source]
        source: ApiError,
    },

    #[error("Failed to close check '{check_id}'")]
    CloseCheck {
        check_id: u64,
        #[source]
        source: ApiError,
    },

    #[error("Error while processing check '{name}'")]
    Report {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to list comments on issue #{issue_number}")]
    ListComments {
        issue_number: u64,
        #[source]
        source: ApiError,
    },

    #[error("Failed to create comment on issue #{issue_number}")]
    CreateComment {
        issue_number: u64,
        #[source]
        source: ApiError,
    },

    #[error("Failed to update comment {comment_id}")]
    UpdateComment {
        comment_id: u64,
        #[source]
        source: ApiError,
    },
}
