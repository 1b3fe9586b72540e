//! GitHub REST API client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::GitHubError;

/// The subset of a pull request the sync tool reports back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
}

/// Request body for `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewPullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

/// Asynchronous GitHub REST API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, GitHubError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let token = token.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("examplesync/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        info!(api_url = %api_url, "created GitHubClient");
        Ok(Self {
            http,
            api_url,
            token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Open a pull request from `head` into `base` on `repo` (`owner/name`).
    #[instrument(skip(self, request), fields(head = request.head, base = request.base))]
    pub async fn create_pull_request(
        &self,
        repo: &str,
        request: &NewPullRequest<'_>,
    ) -> Result<PullRequest, GitHubError> {
        let url = format!("{}/repos/{}/pulls", self.api_url, repo);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        let resp = Self::check_response(resp).await?;
        let pr: PullRequest = resp.json().await?;
        info!(number = pr.number, url = %pr.html_url, "created pull request");
        Ok(pr)
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GitHubError::AuthenticationFailed(format!(
                "HTTP {}",
                status
            )));
        }
        if status.as_u16() == 429 {
            let reset = resp
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            return Err(GitHubError::RateLimited { reset_at: reset });
        }
        // GitHub explains 422s (e.g. "A pull request already exists") in the body.
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP {}", status));
        Err(GitHubError::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}
