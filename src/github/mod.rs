//! GitHub Issues as the survey's record store

pub mod client;
pub mod export;
pub mod issue_body;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::GithubClient;
pub use export::export_records;
pub use issue_body::{build_issue_body, issue_title, parse_issue_body, TITLE_PREFIX};

/// Page size used for every issue listing
pub const PER_PAGE: usize = 100;

/// Upper bound on pages walked by a single listing
pub const MAX_PAGES: u32 = 10;

/// An issue as returned by the REST API (only the fields we read)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
    /// Present only when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Body of a create-issue call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::All => "all",
        }
    }
}

/// Failures talking to the issue tracker. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("GitHub API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    /// A 2xx reply whose body could not be decoded
    #[error("unexpected GitHub response: {0}")]
    UnexpectedBody(String),
}

/// The three calls the survey makes against an issue tracker
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// One page (1-based) of issues in the given state
    async fn list_issues(&self, state: IssueState, page: u32) -> Result<Vec<Issue>, UpstreamError>;

    async fn close_issue(&self, number: u64) -> Result<(), UpstreamError>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue, UpstreamError>;
}

/// Walk pages until a short page or the page cap, skipping pull requests
pub async fn list_all_issues(
    tracker: &dyn IssueTracker,
    state: IssueState,
) -> Result<Vec<Issue>, UpstreamError> {
    let mut issues = Vec::new();

    for page in 1..=MAX_PAGES {
        let batch = tracker.list_issues(state, page).await?;
        let len = batch.len();
        issues.extend(batch.into_iter().filter(|i| !i.is_pull_request()));

        if len < PER_PAGE {
            return Ok(issues);
        }
    }

    log::warn!("Stopped listing {} issues after {} pages", state.as_str(), MAX_PAGES);
    Ok(issues)
}
