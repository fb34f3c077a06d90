//! Check reporter: open → (annotate in chunks)* → close, or a single completed report.
//!
//! # Error Handling
//! Every failure is logged with the check's name or id and returned as a [`PostError`].
//! A failure to open the check comes back as [`PostError::OpenCheck`] so callers can
//! tell "nothing was created" apart from "a check was left in progress".

use std::path::Path;

use chrono::Utc;
use tracing::{error, info};

use crate::annotation::read_annotations;
use crate::batch::{post_annotated_check, ANNOTATION_BATCH_SIZE};
use crate::contract::{
    CheckOutput, CheckRun, CheckRunUpdate, CheckStatus, Conclusion, GitHubApi, NewCheckRun,
    RepoRef,
};
use crate::error::PostError;

/// Opens a new in-progress check run on `sha`.
pub async fn start_check<A>(
    api: &A,
    repo: &RepoRef,
    sha: &str,
    name: &str,
) -> Result<CheckRun, PostError>
where
    A: GitHubApi + ?Sized,
{
    info!(%repo, sha, name, "[CHECK] Opening check...");
    let check = NewCheckRun {
        name: name.to_owned(),
        head_sha: sha.to_owned(),
        status: CheckStatus::InProgress,
        conclusion: None,
        started_at: Some(Utc::now()),
        completed_at: None,
        output: None,
    };
    match api.create_check_run(repo, check).await {
        Ok(run) => {
            info!(check_id = run.id, name = %run.name, "[CHECK] Check opened");
            Ok(run)
        }
        Err(source) => {
            error!(name, error = %source, "[CHECK][ERROR] Failed to open check");
            Err(PostError::OpenCheck {
                name: name.to_owned(),
                source,
            })
        }
    }
}

/// Summary written when a check is closed.
pub fn closing_summary(title: &str, conclusion: Conclusion) -> String {
    format!("{title} concluded with status {conclusion}")
}

/// Completes check run `check_id` with `conclusion`.
pub async fn close_check<A>(
    api: &A,
    repo: &RepoRef,
    check_id: u64,
    title: &str,
    conclusion: Conclusion,
    text: Option<&str>,
) -> Result<CheckRun, PostError>
where
    A: GitHubApi + ?Sized,
{
    info!(check_id, %conclusion, "[CHECK] Closing check...");
    let update = CheckRunUpdate {
        status: CheckStatus::Completed,
        conclusion: Some(conclusion),
        completed_at: Some(Utc::now()),
        output: CheckOutput {
            title: title.to_owned(),
            summary: closing_summary(title, conclusion),
            text: text.map(str::to_owned),
            annotations: Vec::new(),
        },
    };
    api.update_check_run(repo, check_id, update)
        .await
        .map_err(|source| {
            error!(check_id, error = %source, "[CHECK][ERROR] Failed to close check");
            PostError::CloseCheck { check_id, source }
        })
}

/// Reads annotations from `annotations_path`, opens a check, posts the annotations in
/// chunks and closes the check with `conclusion` and `report` as its text.
pub async fn post_check<A>(
    api: &A,
    repo: &RepoRef,
    sha: &str,
    name: &str,
    conclusion: Conclusion,
    annotations_path: &Path,
    report: Option<&str>,
) -> Result<CheckRun, PostError>
where
    A: GitHubApi + ?Sized,
{
    let annotations = read_annotations(annotations_path)?;

    let result = async {
        let open = start_check(api, repo, sha, name).await?;
        let updates = post_annotated_check(
            api,
            repo,
            open.id,
            &open.name,
            &annotations,
            ANNOTATION_BATCH_SIZE,
        )
        .await?;
        info!(check_id = open.id, chunks = updates.len(), "[CHECK] Annotations posted");
        close_check(api, repo, open.id, &open.name, conclusion, report).await
    }
    .await;

    if let Err(e) = &result {
        error!(name, error = %e, "[CHECK][ERROR] Error while processing check");
    }
    result
}

/// Creates an already-completed check run carrying a single report.
#[allow(clippy::too_many_arguments)]
pub async fn post_report<A>(
    api: &A,
    repo: &RepoRef,
    sha: &str,
    name: &str,
    title: &str,
    summary: &str,
    body: &str,
    conclusion: Conclusion,
) -> Result<CheckRun, PostError>
where
    A: GitHubApi + ?Sized,
{
    info!(%repo, sha, name, %conclusion, "[CHECK] Posting report");
    let check = NewCheckRun {
        name: name.to_owned(),
        head_sha: sha.to_owned(),
        status: CheckStatus::Completed,
        conclusion: Some(conclusion),
        started_at: None,
        completed_at: Some(Utc::now()),
        output: Some(CheckOutput {
            title: title.to_owned(),
            summary: summary.to_owned(),
            text: Some(body.to_owned()),
            annotations: Vec::new(),
        }),
    };
    match api.create_check_run(repo, check).await {
        Ok(run) => {
            info!(check_id = run.id, "[CHECK] Report posted");
            Ok(run)
        }
        Err(source) => {
            error!(name, error = %source, "[CHECK][ERROR] Error while processing check");
            Err(PostError::Report {
                name: name.to_owned(),
                source,
            })
        }
    }
}
