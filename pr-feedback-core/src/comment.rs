//! Marker-comment upsert.
//!
//! A comment posted by an earlier run is recognised by its body starting with the
//! marker prefix. The first match (in the host's ascending order) is updated in place;
//! otherwise a new comment is created. Exactly one mutation happens per call.

use std::pin::pin;

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{info, warn};

use crate::contract::{ApiError, Comment, GitHubApi, RepoRef};
use crate::error::PostError;

/// What [`upsert_comment`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOutcome {
    Updated(u64),
    Created(u64),
}

/// Lazily pages through the comments on `issue_number`, starting at page 1.
///
/// Each poll that needs a new page issues one request; dropping the stream stops
/// fetching.
pub fn comment_pages<'a, A>(
    api: &'a A,
    repo: &'a RepoRef,
    issue_number: u64,
) -> impl Stream<Item = Result<Vec<Comment>, ApiError>> + 'a
where
    A: GitHubApi + ?Sized,
{
    stream::try_unfold(Some(1u32), move |page| async move {
        let Some(page) = page else {
            return Ok(None);
        };
        let listed = api.list_comments(repo, issue_number, page).await?;
        Ok(Some((listed.comments, listed.next_page)))
    })
}

/// Returns the first comment whose body starts with `prefix`, fetching no further
/// pages once it is found.
pub async fn find_marked_comment<A>(
    api: &A,
    repo: &RepoRef,
    issue_number: u64,
    prefix: &str,
) -> Result<Option<Comment>, PostError>
where
    A: GitHubApi + ?Sized,
{
    let mut pages = pin!(comment_pages(api, repo, issue_number));
    loop {
        let page = pages
            .try_next()
            .await
            .map_err(|source| PostError::ListComments {
                issue_number,
                source,
            })?;
        let Some(comments) = page else {
            return Ok(None);
        };
        let found = comments.into_iter().find(|comment| {
            comment
                .body
                .as_deref()
                .is_some_and(|body| body.starts_with(prefix))
        });
        if found.is_some() {
            return Ok(found);
        }
    }
}

/// Updates the comment marked with `prefix`, or creates a new one with `body`.
pub async fn upsert_comment<A>(
    api: &A,
    repo: &RepoRef,
    prefix: Option<&str>,
    body: &str,
    issue_number: u64,
) -> Result<CommentOutcome, PostError>
where
    A: GitHubApi + ?Sized,
{
    let existing = match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => find_marked_comment(api, repo, issue_number, prefix).await?,
        None => None,
    };

    if let Some(comment) = existing {
        info!(comment_id = comment.id, "[COMMENT] Comment found, attempting update ...");
        let updated = api
            .update_comment(repo, comment.id, body)
            .await
            .map_err(|source| PostError::UpdateComment {
                comment_id: comment.id,
                source,
            })?;
        info!(comment_id = updated.id, "[COMMENT] Comment updated");
        return Ok(CommentOutcome::Updated(updated.id));
    }

    warn!(issue_number, "[COMMENT] Comment not found, attempting create ...");
    let created = api
        .create_comment(repo, issue_number, body)
        .await
        .map_err(|source| PostError::CreateComment {
            issue_number,
            source,
        })?;
    info!(comment_id = created.id, "[COMMENT] New comment created");
    Ok(CommentOutcome::Created(created.id))
}
