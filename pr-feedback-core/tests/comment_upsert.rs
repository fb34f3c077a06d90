use std::sync::{Arc, Mutex};

use futures::TryStreamExt;
use mockall::predicate::eq;
use pr_feedback_core::comment::{comment_pages, upsert_comment, CommentOutcome};
use pr_feedback_core::contract::{Comment, CommentPage, MockGitHubApi, RepoRef};
use pr_feedback_core::error::PostError;

const MARKER: &str = "<!-- coverage-bot -->";
const PAGE_SIZE: u64 = 30;

fn repo() -> RepoRef {
    RepoRef::new("octo", "widgets")
}

fn unrelated_page(page: u32, last_page: u32) -> CommentPage {
    let base = u64::from(page) * 1000;
    CommentPage {
        comments: (0..PAGE_SIZE)
            .map(|i| Comment {
                id: base + i,
                body: Some(format!("LGTM #{i}")),
            })
            .collect(),
        next_page: (page < last_page).then_some(page + 1),
    }
}

fn page_with_marker(page: u32, last_page: u32) -> CommentPage {
    let mut listed = unrelated_page(page, last_page);
    listed.comments[6] = Comment {
        id: 7,
        body: Some(format!("{MARKER}\nold coverage report")),
    };
    listed
}

#[tokio::test]
async fn updates_marked_comment_and_stops_paginating() {
    let mut api = MockGitHubApi::new();
    api.expect_list_comments()
        .with(eq(repo()), eq(42), eq(1))
        .times(1)
        .returning(|_, _, page| Ok(unrelated_page(page, 3)));
    api.expect_list_comments()
        .with(eq(repo()), eq(42), eq(2))
        .times(1)
        .returning(|_, _, page| Ok(page_with_marker(page, 3)));
    api.expect_list_comments()
        .with(eq(repo()), eq(42), eq(3))
        .never();
    api.expect_update_comment()
        .with(eq(repo()), eq(7), eq(format!("{MARKER}\nnew report")))
        .times(1)
        .returning(|_, id, body| {
            Ok(Comment {
                id,
                body: Some(body.to_string()),
            })
        });
    api.expect_create_comment().never();

    let body = format!("{MARKER}\nnew report");
    let outcome = upsert_comment(&api, &repo(), Some(MARKER), &body, 42)
        .await
        .expect("upsert");
    assert_eq!(outcome, CommentOutcome::Updated(7));
}

#[tokio::test]
async fn creates_comment_when_no_page_matches() {
    let mut api = MockGitHubApi::new();
    api.expect_list_comments()
        .times(3)
        .returning(|_, _, page| Ok(unrelated_page(page, 3)));
    api.expect_update_comment().never();
    api.expect_create_comment()
        .with(eq(repo()), eq(42), eq("<!-- coverage-bot -->\nfresh"))
        .times(1)
        .returning(|_, _, body| {
            Ok(Comment {
                id: 555,
                body: Some(body.to_string()),
            })
        });

    let outcome = upsert_comment(&api, &repo(), Some(MARKER), "<!-- coverage-bot -->\nfresh", 42)
        .await
        .expect("upsert");
    assert_eq!(outcome, CommentOutcome::Created(555));
}

#[tokio::test]
async fn without_prefix_creates_without_listing() {
    let mut api = MockGitHubApi::new();
    api.expect_list_comments().never();
    api.expect_update_comment().never();
    api.expect_create_comment()
        .times(1)
        .returning(|_, _, _| Ok(Comment { id: 9, body: None }));

    let outcome = upsert_comment(&api, &repo(), None, "hello", 42)
        .await
        .expect("upsert");
    assert_eq!(outcome, CommentOutcome::Created(9));
}

#[tokio::test]
async fn comments_without_body_never_match() {
    let mut api = MockGitHubApi::new();
    api.expect_list_comments().times(1).returning(|_, _, _| {
        Ok(CommentPage {
            comments: vec![Comment { id: 1, body: None }],
            next_page: None,
        })
    });
    api.expect_create_comment()
        .times(1)
        .returning(|_, _, _| Ok(Comment { id: 2, body: None }));

    let outcome = upsert_comment(&api, &repo(), Some(MARKER), "body", 42)
        .await
        .expect("upsert");
    assert_eq!(outcome, CommentOutcome::Created(2));
}

#[tokio::test]
async fn listing_failure_is_reported_without_mutation() {
    let mut api = MockGitHubApi::new();
    api.expect_list_comments()
        .returning(|_, _, _| Err("Not Found".into()));
    api.expect_create_comment().never();
    api.expect_update_comment().never();

    let err = upsert_comment(&api, &repo(), Some(MARKER), "body", 42)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::ListComments { issue_number: 42, .. }));
}

#[tokio::test]
async fn comment_pages_fetches_only_what_is_consumed() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let seen = requested.clone();
    let mut api = MockGitHubApi::new();
    api.expect_list_comments().returning(move |_, _, page| {
        seen.lock().unwrap().push(page);
        Ok(unrelated_page(page, 5))
    });

    let repo = repo();
    let mut pages = Box::pin(comment_pages(&api, &repo, 42));
    let first = pages.try_next().await.unwrap().expect("first page");
    assert_eq!(first.len(), PAGE_SIZE as usize);
    drop(pages);

    assert_eq!(*requested.lock().unwrap(), vec![1]);
}
