//! REST client for the GitHub Issues API

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use super::{Issue, IssueState, IssueTracker, NewIssue, UpstreamError, PER_PAGE};
use crate::error::Result;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY: usize = 400;

const USER_AGENT: &str = concat!("event-survey/", env!("CARGO_PKG_VERSION"));

/// Issues client bound to one repository
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubClient {
    /// Create a client with a per-request timeout
    pub fn new(
        api_base: &str,
        owner: &str,
        repo: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        // Fail on a bad base URL now rather than on the first request
        Url::parse(api_base)?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    fn issues_url(&self) -> std::result::Result<Url, UpstreamError> {
        let raw = format!("{}/repos/{}/{}/issues", self.api_base, self.owner, self.repo);
        Url::parse(&raw).map_err(|e| UpstreamError::Unreachable(format!("invalid URL {}: {}", raw, e)))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send a request and hand back the body text of a 2xx response
    async fn send(&self, builder: reqwest::RequestBuilder) -> std::result::Result<(StatusCode, String), UpstreamError> {
        let response = builder.send().await.map_err(unreachable)?;
        let status = response.status();
        let text = response.text().await.map_err(unreachable)?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok((status, text))
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn list_issues(&self, state: IssueState, page: u32) -> std::result::Result<Vec<Issue>, UpstreamError> {
        let mut url = self.issues_url()?;
        url.query_pairs_mut()
            .append_pair("state", state.as_str())
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string());

        log::debug!("Listing {} issues, page {}", state.as_str(), page);
        let (status, text) = self.send(self.request(reqwest::Method::GET, url)).await?;
        decode(status, &text)
    }

    async fn close_issue(&self, number: u64) -> std::result::Result<(), UpstreamError> {
        let mut url = self.issues_url()?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Unreachable("API base URL cannot hold a path".to_string()))?
            .push(&number.to_string());

        log::info!("Closing issue #{}", number);
        self.send(
            self.request(reqwest::Method::PATCH, url)
                .json(&serde_json::json!({ "state": "closed" })),
        )
        .await?;
        Ok(())
    }

    async fn create_issue(&self, issue: &NewIssue) -> std::result::Result<Issue, UpstreamError> {
        let url = self.issues_url()?;

        log::info!("Creating issue \"{}\"", issue.title);
        let (status, text) = self.send(self.request(reqwest::Method::POST, url).json(issue)).await?;
        decode(status, &text)
    }
}

fn unreachable(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Unreachable(format!("request timed out: {}", e))
    } else {
        UpstreamError::Unreachable(e.to_string())
    }
}

fn decode<T: serde::de::DeserializeOwned>(status: StatusCode, text: &str) -> std::result::Result<T, UpstreamError> {
    serde_json::from_str(text).map_err(|e| UpstreamError::UnexpectedBody(format!("{} body: {}", status.as_u16(), e)))
}

/// Prefer the API's `message` (or `error`) field; fall back to the raw body, truncated
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let field = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str());
        if let Some(message) = field {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        return "GitHub API error".to_string();
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let body = r#"{"message":"Validation Failed","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(error_message(body), "Validation Failed");
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
    }

    #[test]
    fn test_error_message_truncates_plain_body() {
        let body = "x".repeat(1000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY);
        assert_eq!(error_message(""), "GitHub API error");
    }

    #[test]
    fn test_issues_url() {
        let client = GithubClient::new(
            "https://ghe.example.com/api/v3/",
            "owner",
            "repo",
            "token",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.issues_url().unwrap().as_str(),
            "https://ghe.example.com/api/v3/repos/owner/repo/issues"
        );
    }

    #[test]
    fn test_undecodable_success_body() {
        let err = decode::<Issue>(StatusCode::CREATED, "<html>").unwrap_err();
        assert!(matches!(err, UpstreamError::UnexpectedBody(ref m) if m.starts_with("201 body")));

        let issue: Issue = decode(StatusCode::OK, r#"{"number":3,"title":"t"}"#).unwrap();
        assert_eq!(issue.number, 3);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        assert!(GithubClient::new("not a url", "o", "r", "t", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_unreachable() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = GithubClient::new("http://127.0.0.1:9", "o", "r", "t", Duration::from_secs(2)).unwrap();
        let err = client.list_issues(IssueState::Open, 1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unreachable(_)));
    }
}
