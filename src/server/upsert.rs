//! Close-then-create: keep at most one open issue per player.
//!
//! The tracker offers no transaction, so this is a best-effort two-phase
//! operation. Two submissions for the same player racing each other can both
//! see "no open issue" and both create one; that is accepted.

use serde::Serialize;

use crate::error::Result;
use crate::github::{
    build_issue_body, issue_title, list_all_issues, Issue, IssueState, IssueTracker, NewIssue, UpstreamError,
};
use crate::model::SubmissionRecord;

/// A stale issue that could not be closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseFailure {
    pub number: u64,
    pub error: String,
}

/// How an upsert ended, when the new issue was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New issue created and every stale one closed
    Created { issue: Issue, closed: Vec<u64> },
    /// New issue created, but some stale issues are still open
    CreatedWithStaleIssues {
        issue: Issue,
        closed: Vec<u64>,
        failed: Vec<CloseFailure>,
    },
}

impl UpsertOutcome {
    pub fn issue(&self) -> &Issue {
        match self {
            UpsertOutcome::Created { issue, .. } | UpsertOutcome::CreatedWithStaleIssues { issue, .. } => issue,
        }
    }

    pub fn closed(&self) -> &[u64] {
        match self {
            UpsertOutcome::Created { closed, .. } | UpsertOutcome::CreatedWithStaleIssues { closed, .. } => closed,
        }
    }

    pub fn failed(&self) -> &[CloseFailure] {
        match self {
            UpsertOutcome::Created { .. } => &[],
            UpsertOutcome::CreatedWithStaleIssues { failed, .. } => failed,
        }
    }
}

/// Open issues already filed for this title
async fn open_issues_titled(tracker: &dyn IssueTracker, title: &str) -> std::result::Result<Vec<u64>, UpstreamError> {
    let issues = list_all_issues(tracker, IssueState::Open).await?;
    Ok(issues
        .into_iter()
        .filter(|i| i.title == title)
        .map(|i| i.number)
        .collect())
}

/// File a submission, closing the player's previous open issues first.
///
/// A failed listing aborts before any change. A failed close is recorded
/// and the create still happens. A failed create is returned as an error;
/// closes that already happened are not undone.
pub async fn upsert_submission(
    tracker: &dyn IssueTracker,
    record: &SubmissionRecord,
    labels: &[String],
) -> Result<UpsertOutcome> {
    let title = issue_title(&record.player_name);
    let new_issue = NewIssue {
        title: title.clone(),
        body: build_issue_body(record)?,
        labels: labels.to_vec(),
    };

    let stale = open_issues_titled(tracker, &title).await?;
    if !stale.is_empty() {
        log::info!("Closing {} stale issue(s) for \"{}\"", stale.len(), title);
    }

    let mut closed = Vec::new();
    let mut failed = Vec::new();
    for number in stale {
        match tracker.close_issue(number).await {
            Ok(()) => closed.push(number),
            Err(e) => {
                log::warn!("Could not close issue #{}: {}", number, e);
                failed.push(CloseFailure {
                    number,
                    error: e.to_string(),
                });
            }
        }
    }

    let issue = tracker.create_issue(&new_issue).await?;
    log::info!("Created issue #{} for \"{}\"", issue.number, title);

    Ok(if failed.is_empty() {
        UpsertOutcome::Created { issue, closed }
    } else {
        UpsertOutcome::CreatedWithStaleIssues { issue, closed, failed }
    })
}
