//! In-memory issue tracker for tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{Issue, IssueState, IssueTracker, NewIssue, UpstreamError, PER_PAGE};

#[derive(Default)]
pub struct FakeTracker {
    pub issues: Mutex<Vec<Issue>>,
    pub fail_list: Option<UpstreamError>,
    pub fail_close: HashSet<u64>,
    pub fail_create: Option<UpstreamError>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues: Mutex::new(issues),
            ..Default::default()
        }
    }

    pub fn open_issue(number: u64, title: &str) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            html_url: format!("https://github.com/owner/repo/issues/{}", number),
            state: "open".to_string(),
            body: None,
            pull_request: None,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn open_titles(&self) -> Vec<String> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.state == "open")
            .map(|i| i.title.clone())
            .collect()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(&self, state: IssueState, page: u32) -> Result<Vec<Issue>, UpstreamError> {
        self.calls.lock().unwrap().push(format!("list {} {}", state.as_str(), page));
        if let Some(err) = &self.fail_list {
            return Err(err.clone());
        }

        let issues = self.issues.lock().unwrap();
        Ok(issues
            .iter()
            .filter(|i| state == IssueState::All || i.state == "open")
            .skip((page as usize - 1) * PER_PAGE)
            .take(PER_PAGE)
            .cloned()
            .collect())
    }

    async fn close_issue(&self, number: u64) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(format!("close {}", number));
        if self.fail_close.contains(&number) {
            return Err(UpstreamError::Status {
                status: 403,
                message: "Resource not accessible by integration".to_string(),
            });
        }

        let mut issues = self.issues.lock().unwrap();
        if let Some(issue) = issues.iter_mut().find(|i| i.number == number) {
            issue.state = "closed".to_string();
        }
        Ok(())
    }

    async fn create_issue(&self, new: &NewIssue) -> Result<Issue, UpstreamError> {
        self.calls.lock().unwrap().push(format!("create {}", new.title));
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }

        let mut issues = self.issues.lock().unwrap();
        let number = issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let mut issue = Self::open_issue(number, &new.title);
        issue.body = Some(new.body.clone());
        issues.push(issue.clone());
        Ok(issue)
    }
}
