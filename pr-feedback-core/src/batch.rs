//! Annotation batching for check runs.
//!
//! The host caps annotations per update call, so a large annotation set is split into
//! contiguous chunks and each chunk is sent as its own in-progress update. The host
//! appends annotations on every update, so chunks are sent concurrently; a failed
//! chunk is returned to the caller and chunks that already landed stay applied.

use futures::future::try_join_all;
use tracing::{error, info};

use crate::annotation::Annotation;
use crate::contract::{CheckOutput, CheckRun, CheckRunUpdate, CheckStatus, GitHubApi, RepoRef};
use crate::error::PostError;

/// Maximum number of annotations sent in a single update call.
pub const ANNOTATION_BATCH_SIZE: usize = 50;

/// Progress line used as the summary of each chunk update.
pub fn chunk_summary(total: usize, chunk: usize, chunk_count: usize) -> String {
    format!("Processing {total} annotations, chunk {chunk} out of {chunk_count}...")
}

/// Posts `annotations` to check run `check_id` in chunks of at most `batch_size`.
///
/// Returns one confirmation per chunk, in chunk order.
pub async fn post_annotated_check<A>(
    api: &A,
    repo: &RepoRef,
    check_id: u64,
    title: &str,
    annotations: &[Annotation],
    batch_size: usize,
) -> Result<Vec<CheckRun>, PostError>
where
    A: GitHubApi + ?Sized,
{
    let batch_size = batch_size.max(1);
    let total = annotations.len();
    let chunk_count = total.div_ceil(batch_size);

    let updates = annotations
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| {
            let chunk_number = index + 1;
            let summary = chunk_summary(total, chunk_number, chunk_count);
            info!(check_id, chunk = chunk_number, size = chunk.len(), "[CHECK] {summary}");
            let update = CheckRunUpdate {
                status: CheckStatus::InProgress,
                conclusion: None,
                completed_at: None,
                output: CheckOutput {
                    title: title.to_owned(),
                    summary,
                    text: None,
                    annotations: chunk.to_vec(),
                },
            };
            async move {
                api.update_check_run(repo, check_id, update)
                    .await
                    .map_err(|source| {
                        error!(check_id, chunk = chunk_number, error = %source, "[CHECK][ERROR] Chunk update failed");
                        PostError::UpdateCheck {
                            check_id,
                            chunk: chunk_number,
                            source,
                        }
                    })
            }
        });

    try_join_all(updates).await
}
