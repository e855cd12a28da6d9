//! HTTP client that posts a completed form to the submission endpoint

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::error::Result;
use crate::model::SubmissionPayload;

const USER_AGENT: &str = concat!("event-survey/", env!("CARGO_PKG_VERSION"));

/// What the user sees after a failed submit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Network error. Please try again.")]
    Network(String),

    #[error("{}", server_error_text(*status, stage.as_deref(), *github_status, error.as_deref()))]
    Server {
        status: u16,
        stage: Option<String>,
        github_status: Option<u16>,
        error: Option<String>,
    },

    #[error("API error. Please try again.")]
    Api,
}

/// Accepted submission as reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message: String,
    pub issue_number: Option<u64>,
    pub issue_url: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    stage: Option<String>,
    #[serde(rename = "githubStatus")]
    github_status: Option<u16>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct IssueRef {
    number: Option<u64>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct SuccessBody {
    #[serde(default)]
    ok: bool,
    message: Option<String>,
    issue: Option<IssueRef>,
}

/// `Server error (<status>).` followed by whichever details the server sent
pub fn server_error_text(status: u16, stage: Option<&str>, github_status: Option<u16>, error: Option<&str>) -> String {
    let mut text = format!("Server error ({}).", status);
    if let Some(stage) = stage.filter(|s| !s.is_empty()) {
        text.push_str(&format!(" [{}]", stage));
    }
    if let Some(code) = github_status.filter(|c| *c != 0) {
        text.push_str(&format!(" GitHub:{}", code));
    }
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        text.push_str(&format!(" - {}", error));
    }
    text
}

pub struct SubmitClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SubmitClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> std::result::Result<SubmitReceipt, SubmitError> {
        log::debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        interpret_response(status.as_u16(), &text)
    }
}

/// Turn a status code and body into the submit result
pub fn interpret_response(status: u16, body: &str) -> std::result::Result<SubmitReceipt, SubmitError> {
    if !(200..300).contains(&status) {
        let detail: ErrorDetail = serde_json::from_str(body).unwrap_or_default();
        return Err(SubmitError::Server {
            status,
            stage: detail.stage,
            github_status: detail.github_status,
            error: detail.error,
        });
    }

    match serde_json::from_str::<SuccessBody>(body) {
        Ok(parsed) if parsed.ok => {
            let (issue_number, issue_url) = parsed
                .issue
                .map(|i| (i.number, i.url))
                .unwrap_or((None, None));
            Ok(SubmitReceipt {
                message: parsed.message.unwrap_or_else(|| "Submitted.".to_string()),
                issue_number,
                issue_url,
            })
        }
        _ => Err(SubmitError::Api),
    }
}
