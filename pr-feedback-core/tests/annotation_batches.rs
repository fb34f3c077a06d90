use std::sync::{Arc, Mutex};

use pr_feedback_core::annotation::{Annotation, AnnotationLevel};
use pr_feedback_core::batch::{chunk_summary, post_annotated_check, ANNOTATION_BATCH_SIZE};
use pr_feedback_core::contract::{CheckRun, CheckRunUpdate, CheckStatus, MockGitHubApi, RepoRef};
use pr_feedback_core::error::PostError;

fn annotation(line: u32) -> Annotation {
    Annotation {
        path: format!("src/file_{line}.rs"),
        annotation_level: AnnotationLevel::Warning,
        message: format!("finding on line {line}"),
        title: None,
        raw_details: None,
        start_line: line,
        end_line: line,
        start_column: None,
        end_column: None,
    }
}

fn repo() -> RepoRef {
    RepoRef::new("octo", "widgets")
}

fn recording_api(calls: Arc<Mutex<Vec<CheckRunUpdate>>>) -> MockGitHubApi {
    let mut api = MockGitHubApi::new();
    api.expect_update_check_run()
        .returning(move |_repo: &RepoRef, check_run_id: u64, update: CheckRunUpdate| {
            calls.lock().unwrap().push(update);
            Ok(CheckRun {
                id: check_run_id,
                name: "lint".to_string(),
                status: Some("in_progress".to_string()),
                html_url: None,
            })
        });
    api
}

#[test]
fn chunk_summary_reports_total_and_position() {
    assert_eq!(
        chunk_summary(187, 2, 4),
        "Processing 187 annotations, chunk 2 out of 4..."
    );
}

#[tokio::test]
async fn splits_187_annotations_into_four_ordered_chunks() {
    let annotations: Vec<Annotation> = (1..=187).map(annotation).collect();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let api = recording_api(calls.clone());

    let confirmations = post_annotated_check(
        &api,
        &repo(),
        99,
        "lint",
        &annotations,
        ANNOTATION_BATCH_SIZE,
    )
    .await
    .expect("all chunks accepted");
    assert_eq!(confirmations.len(), 4);

    let mut calls = calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 4);
    calls.sort_by_key(|update| update.output.summary.clone());

    let sizes: Vec<usize> = calls.iter().map(|u| u.output.annotations.len()).collect();
    assert_eq!(sizes, vec![50, 50, 50, 37]);

    for (index, update) in calls.iter().enumerate() {
        assert_eq!(update.status, CheckStatus::InProgress);
        assert_eq!(update.conclusion, None);
        assert_eq!(update.output.title, "lint");
        assert_eq!(update.output.summary, chunk_summary(187, index + 1, 4));
    }

    let rejoined: Vec<Annotation> = calls
        .into_iter()
        .flat_map(|update| update.output.annotations)
        .collect();
    assert_eq!(rejoined, annotations);
}

#[tokio::test]
async fn exact_multiple_of_batch_size_has_no_trailing_chunk() {
    let annotations: Vec<Annotation> = (1..=100).map(annotation).collect();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let api = recording_api(calls.clone());

    post_annotated_check(&api, &repo(), 1, "lint", &annotations, 50)
        .await
        .expect("two chunks");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|u| u.output.annotations.len() == 50));
}

#[tokio::test]
async fn no_annotations_issue_no_updates() {
    let mut api = MockGitHubApi::new();
    api.expect_update_check_run().never();

    let confirmations = post_annotated_check(&api, &repo(), 1, "lint", &[], ANNOTATION_BATCH_SIZE)
        .await
        .expect("nothing to post");
    assert!(confirmations.is_empty());
}

#[tokio::test]
async fn failed_chunk_propagates_with_its_index() {
    let annotations: Vec<Annotation> = (1..=120).map(annotation).collect();
    let mut api = MockGitHubApi::new();
    api.expect_update_check_run()
        .returning(|_repo: &RepoRef, check_run_id: u64, update: CheckRunUpdate| {
            if update.output.summary.contains("chunk 2 ") {
                Err("secondary rate limit".into())
            } else {
                Ok(CheckRun {
                    id: check_run_id,
                    name: "lint".to_string(),
                    status: None,
                    html_url: None,
                })
            }
        });

    let err = post_annotated_check(&api, &repo(), 7, "lint", &annotations, 50)
        .await
        .unwrap_err();
    match err {
        PostError::UpdateCheck { check_id, chunk, .. } => {
            assert_eq!(check_id, 7);
            assert_eq!(chunk, 2);
        }
        other => panic!("expected UpdateCheck, got {other:?}"),
    }
}
