///
/// This module implements the CLI interface for pr-feedback: the input surface, the
/// async entrypoint and the mapping of failures to exit codes.
///
/// All decisions about what gets posted live in the [`pr-feedback-core`] crate. This
/// module only gathers inputs, builds the context and the client, and dispatches.
///
/// ## Inputs
/// Every flag falls back to the environment variable the Actions runner sets for the
/// matching action input (`INPUT_TOKEN`, `INPUT_MODE`, ...), so the binary runs
/// unchanged as an action step or from a shell.
///
/// ## How To Use
/// - In a workflow: set the action inputs; no flags are needed.
/// - Programmatically or in tests: call [`run`] with a constructed [`Cli`], or
///   [`execute`] with any [`GitHubApi`] implementation.
///
/// [`pr-feedback-core`]: ../../pr-feedback-core/
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pr_feedback_core::check::{post_check, post_report};
use pr_feedback_core::comment::upsert_comment;
use pr_feedback_core::contract::GitHubApi;
use pr_feedback_core::error::PostError;
use pr_feedback_core::inputs::{validate, Command, RawInputs, Target};

use crate::github::{GitHubClient, DEFAULT_API_URL};
use crate::load_context::load_context;

pub const DEFAULT_MODE: &str = "comment";

/// Exit code used when the check run itself could not be opened.
pub const EXIT_CHECK_NOT_OPENED: u8 = 2;

/// Post a marker comment or an annotated check run onto a pull request.
#[derive(Parser, Debug, Default)]
#[clap(
    name = "pr-feedback",
    version,
    about = "Post a marker comment or an annotated check run onto a pull request"
)]
pub struct Cli {
    /// Token used to authenticate against the GitHub API
    #[clap(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File whose contents become the body (ignored when --message is set)
    #[clap(long, env = "INPUT_FILE")]
    pub file: Option<PathBuf>,

    /// Literal body text
    #[clap(long, env = "INPUT_MESSAGE")]
    pub message: Option<String>,

    /// `comment` or `check` (default: comment)
    #[clap(long, env = "INPUT_MODE")]
    pub mode: Option<String>,

    /// Marker identifying the comment to update (comment mode)
    #[clap(long, env = "INPUT_PREFIX")]
    pub prefix: Option<String>,

    /// Check run name (check mode)
    #[clap(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Check run title (check mode)
    #[clap(long, env = "INPUT_TITLE")]
    pub title: Option<String>,

    /// Check run summary (check mode)
    #[clap(long, env = "INPUT_SUMMARY")]
    pub summary: Option<String>,

    /// `success`, `failure` or `cancelled` (check mode)
    #[clap(long, env = "INPUT_CONCLUSION")]
    pub conclusion: Option<String>,

    /// Path to a JSON array of annotations (check mode)
    #[clap(long, env = "INPUT_ANNOTATIONS")]
    pub annotations: Option<PathBuf>,

    /// GitHub API base URL
    #[clap(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

impl Cli {
    pub fn raw_inputs(&self) -> RawInputs {
        let mode = self
            .mode
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODE.to_string());
        RawInputs {
            token: self.token.clone(),
            file: self.file.clone(),
            message: self.message.clone(),
            mode: Some(mode),
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            conclusion: self.conclusion.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

/// Posts the feedback described by `command` through `api`.
pub async fn execute<A>(api: &A, command: &Command) -> Result<(), PostError>
where
    A: GitHubApi + ?Sized,
{
    let repo = &command.repository;
    match &command.target {
        Target::Comment {
            prefix,
            issue_number,
        } => {
            let outcome =
                upsert_comment(api, repo, Some(prefix.as_str()), &command.body, *issue_number).await?;
            tracing::info!(mode = "comment", ?outcome, "Comment posted");
        }
        Target::Check(check) => {
            let run = match &check.annotations {
                Some(path) => {
                    post_check(
                        api,
                        repo,
                        &check.sha,
                        &check.name,
                        check.conclusion,
                        path,
                        Some(command.body.as_str()),
                    )
                    .await?
                }
                None => {
                    post_report(
                        api,
                        repo,
                        &check.sha,
                        &check.name,
                        &check.title,
                        &check.summary,
                        &command.body,
                        check.conclusion,
                    )
                    .await?
                }
            };
            tracing::info!(mode = "check", check_id = run.id, url = ?run.html_url, "Check posted");
        }
    }
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    // Static input errors are reported before the runner context is read.
    let validated = validate(cli.raw_inputs())?;
    let context = load_context()?;
    let command = validated.bind(&context)?;
    tracing::info!(mode = %command.mode(), repository = %command.repository, "Inputs resolved");

    let client = GitHubClient::new(&cli.api_url, &command.token)
        .context("Failed to construct GitHub client")?;
    execute(&client, &command).await?;
    Ok(())
}

/// Process exit code for a failed [`run`].
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PostError>() {
        Some(PostError::OpenCheck { .. }) => EXIT_CHECK_NOT_OPENED,
        _ => 1,
    }
}
