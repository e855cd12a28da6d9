use clap::Args;
use std::time::Duration;

use crate::github::client::DEFAULT_API_URL;

/// Server settings, read once from flags or the process environment
#[derive(Args, Debug, Clone, Default)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8787)]
    pub port: u16,

    /// Token used to create and close issues
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Owner of the repository that stores submissions
    #[arg(long, env = "GITHUB_OWNER")]
    pub github_owner: Option<String>,

    /// Repository that stores submissions
    #[arg(long, env = "GITHUB_REPO")]
    pub github_repo: Option<String>,

    /// Comma-separated labels added to every new issue
    #[arg(long, env = "GITHUB_LABELS", default_value = "")]
    pub github_labels: String,

    /// REST API base URL (GitHub Enterprise or a local stand-in)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Comma-separated CORS origins; empty allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "")]
    pub allowed_origins: String,

    /// Timeout for each call to the issue tracker
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 15)]
    pub upstream_timeout_secs: u64,
}

impl ServerConfig {
    pub fn token(&self) -> Option<&str> {
        non_blank(self.github_token.as_deref())
    }

    pub fn owner(&self) -> Option<&str> {
        non_blank(self.github_owner.as_deref())
    }

    pub fn repo(&self) -> Option<&str> {
        non_blank(self.github_repo.as_deref())
    }

    pub fn labels(&self) -> Vec<String> {
        split_list(&self.github_labels)
    }

    pub fn origins(&self) -> Vec<String> {
        split_list(&self.allowed_origins)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Environment variables the submission path needs but does not have
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token().is_none() {
            missing.push("GITHUB_TOKEN");
        }
        if self.owner().is_none() {
            missing.push("GITHUB_OWNER");
        }
        if self.repo().is_none() {
            missing.push("GITHUB_REPO");
        }
        missing
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
