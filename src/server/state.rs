use std::sync::Arc;

use super::config::ServerConfig;
use crate::error::Result;
use crate::github::{GithubClient, IssueTracker};

/// Immutable per-process state shared by every request
pub struct AppState {
    pub config: ServerConfig,
    /// `None` when the GitHub settings are incomplete
    pub tracker: Option<Arc<dyn IssueTracker>>,
    pub labels: Vec<String>,
    pub origins: Vec<String>,
}

impl AppState {
    /// Build the state, connecting to GitHub only when fully configured.
    ///
    /// Missing settings do not stop the server: health keeps answering and
    /// submissions fail with a configuration error.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let tracker: Option<Arc<dyn IssueTracker>> = match (config.token(), config.owner(), config.repo()) {
            (Some(token), Some(owner), Some(repo)) => {
                log::info!("Submissions go to {}/{}", owner, repo);
                Some(Arc::new(GithubClient::new(
                    &config.github_api_url,
                    owner,
                    repo,
                    token,
                    config.upstream_timeout(),
                )?))
            }
            _ => {
                log::warn!(
                    "Submissions disabled, missing: {}",
                    config.missing_settings().join(", ")
                );
                None
            }
        };

        Ok(Self::with_tracker(config, tracker))
    }

    pub fn with_tracker(config: ServerConfig, tracker: Option<Arc<dyn IssueTracker>>) -> Self {
        let labels = config.labels();
        let origins = config.origins();
        Self {
            config,
            tracker,
            labels,
            origins,
        }
    }
}
