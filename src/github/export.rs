//! Rebuild the raw submission log (one record per issue) from the tracker

use super::{list_all_issues, parse_issue_body, IssueState, IssueTracker, TITLE_PREFIX};
use crate::error::Result;
use crate::model::SubmissionRecord;

/// Every survey issue, open or closed, parsed back into a record.
///
/// Issues are returned oldest first so the output reads like an
/// append-only log. Issues whose body cannot be parsed are skipped with a
/// warning.
pub async fn export_records(tracker: &dyn IssueTracker) -> Result<Vec<SubmissionRecord>> {
    let mut issues = list_all_issues(tracker, IssueState::All).await?;
    issues.retain(|i| i.title.starts_with(TITLE_PREFIX));
    issues.sort_by_key(|i| i.number);

    let mut records = Vec::with_capacity(issues.len());
    for issue in &issues {
        let body = issue.body.as_deref().unwrap_or_default();
        match parse_issue_body(body) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Issue #{}: skipped, {}", issue.number, e),
        }
    }

    log::info!("Exported {} of {} survey issues", records.len(), issues.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeTracker;
    use crate::github::{build_issue_body, issue_title, Issue};

    fn survey_issue(number: u64, name: &str, timestamp: &str) -> Issue {
        let record = SubmissionRecord {
            timestamp: timestamp.to_string(),
            language: "en".to_string(),
            player_name: name.to_string(),
            q2_time: "A".to_string(),
            q3_time: "B".to_string(),
            q4_day: "C".to_string(),
        };
        let mut issue = FakeTracker::open_issue(number, &issue_title(name));
        issue.state = "closed".to_string();
        issue.body = Some(build_issue_body(&record).unwrap());
        issue
    }

    #[tokio::test]
    async fn test_export_orders_by_number_and_skips_foreign_issues() {
        let mut unrelated = survey_issue(2, "x", "t");
        unrelated.title = "Bug report".to_string();
        let mut broken = survey_issue(4, "Carol", "t");
        broken.body = Some("nothing here".to_string());
        let mut pr = survey_issue(6, "Dave", "t");
        pr.pull_request = Some(serde_json::json!({ "url": "https://example.com" }));

        let tracker = FakeTracker::with_issues(vec![
            survey_issue(5, "Bob", "2025-01-03T00:00:00Z"),
            unrelated,
            survey_issue(1, "Alice", "2025-01-01T00:00:00Z"),
            broken,
            pr,
        ]);

        let records = export_records(&tracker).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(tracker.calls(), vec!["list all 1"]);
    }
}
