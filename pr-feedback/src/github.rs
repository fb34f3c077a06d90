#![doc = "GitHub REST client: bridges the core `GitHubApi` contract to the host's HTTP API."]
//
//! # GitHub client
//!
//! [`GitHubClient`] implements [`GitHubApi`] with `reqwest`. It is the only place in the
//! workspace that knows URLs, headers and pagination details of the host.
//!
//! - Construct with [`GitHubClient::new`] from the API base URL and a token.
//! - Comment listing follows the `Link` response header to find the next page.
//! - Non-2xx responses become [`GitHubHttpError::Status`] with the response body, so
//!   the host's own error message reaches the job log.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use pr_feedback_core::contract::{
    ApiError, CheckRun, CheckRunUpdate, Comment, CommentPage, GitHubApi, NewCheckRun, RepoRef,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const COMMENTS_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum GitHubHttpError {
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("token is not a valid header value")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Builds a client for `base_url` (e.g. `https://api.github.com`). An empty token
    /// sends unauthenticated requests.
    pub fn new(base_url: &str, token: &str) -> Result<Self, GitHubHttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pr-feedback/", env!("CARGO_PKG_VERSION"))),
        );
        if !token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(GitHubHttpError::Client)?;

        tracing::info!(
            base_url,
            token_set = !token.is_empty(),
            "Initialized GitHub client"
        );
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, GitHubHttpError> {
        tracing::debug!(%method, %url, "Sending GitHub request");
        let response = build(self.http.request(method.clone(), &url))
            .send()
            .await
            .map_err(|source| GitHubHttpError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%method, %url, %status, body = %body, "GitHub request failed");
        Err(GitHubHttpError::Status {
            method,
            url,
            status,
            body,
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, GitHubHttpError> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|source| GitHubHttpError::Transport { url, source })
    }
}

/// Extracts the page number of the `rel="next"` entry of a `Link` header.
pub fn next_page(link: &str) -> Option<u32> {
    static NEXT: OnceLock<Regex> = OnceLock::new();
    let re = NEXT.get_or_init(|| {
        Regex::new(r#"<[^>]*[?&]page=(\d+)[^>]*>;\s*rel="next""#).expect("valid link regex")
    });
    re.captures(link)?.get(1)?.as_str().parse().ok()
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_comments(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        page: u32,
    ) -> Result<CommentPage, ApiError> {
        let url = self.url(&format!(
            "/repos/{}/{}/issues/{}/comments",
            repo.owner, repo.name, issue_number
        ));
        let response = self
            .send(Method::GET, url, |req| {
                req.query(&[("per_page", COMMENTS_PER_PAGE), ("page", page)])
            })
            .await?;

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page);
        let comments: Vec<Comment> = Self::json(response).await?;
        tracing::info!(
            issue_number,
            page,
            count = comments.len(),
            next_page = ?next,
            "Fetched comment page"
        );
        Ok(CommentPage {
            comments,
            next_page: next,
        })
    }

    async fn create_comment(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let url = self.url(&format!(
            "/repos/{}/{}/issues/{}/comments",
            repo.owner, repo.name, issue_number
        ));
        let response = self
            .send(Method::POST, url, |req| req.json(&json!({ "body": body })))
            .await?;
        Ok(Self::json(response).await?)
    }

    async fn update_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let url = self.url(&format!(
            "/repos/{}/{}/issues/comments/{}",
            repo.owner, repo.name, comment_id
        ));
        let response = self
            .send(Method::PATCH, url, |req| req.json(&json!({ "body": body })))
            .await?;
        Ok(Self::json(response).await?)
    }

    async fn create_check_run(
        &self,
        repo: &RepoRef,
        check: NewCheckRun,
    ) -> Result<CheckRun, ApiError> {
        let url = self.url(&format!("/repos/{}/{}/check-runs", repo.owner, repo.name));
        let response = self
            .send(Method::POST, url, |req| req.json(&check))
            .await?;
        Ok(Self::json(response).await?)
    }

    async fn update_check_run(
        &self,
        repo: &RepoRef,
        check_run_id: u64,
        update: CheckRunUpdate,
    ) -> Result<CheckRun, ApiError> {
        let url = self.url(&format!(
            "/repos/{}/{}/check-runs/{}",
            repo.owner, repo.name, check_run_id
        ));
        let response = self
            .send(Method::PATCH, url, |req| req.json(&update))
            .await?;
        Ok(Self::json(response).await?)
    }
}
