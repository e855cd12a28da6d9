//! Issue title/body layout for survey submissions, and the parser that reads it back

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::space0,
    IResult, Parser,
};
use std::collections::HashMap;

use crate::error::{Result, SurveyError};
use crate::model::{sanitize_text, SubmissionRecord, RECORD_FIELDS};

pub const TITLE_PREFIX: &str = "Survey Response: ";

const BODY_HEADER: &str = "Event Survey Submission";
const MAX_TITLE_LEN: usize = 120;

/// Issue title shared by every submission of one player
pub fn issue_title(player_name: &str) -> String {
    sanitize_text(&format!("{}{}", TITLE_PREFIX, player_name), MAX_TITLE_LEN)
}

/// Line-oriented body, followed by the record as fenced JSON
pub fn build_issue_body(record: &SubmissionRecord) -> Result<String> {
    let mut lines = vec![BODY_HEADER.to_string(), String::new()];
    for (key, value) in RECORD_FIELDS.iter().zip(record.values()) {
        lines.push(format!("{}: {}", key, value));
    }
    lines.push(String::new());
    lines.push("raw_json:".to_string());
    lines.push("```json".to_string());
    lines.push(serde_json::to_string_pretty(record)?);
    lines.push("```".to_string());
    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// Parse a `key: value` line
fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)?;
    let (input, _) = tag(":").parse(input)?;
    let (input, _) = space0.parse(input)?;
    Ok(("", (key, input.trim_end())))
}

/// Extract the contents of the fenced ```json block, if any
fn fenced_json(body: &str) -> Option<&str> {
    let start = body.find("```json")? + "```json".len();
    let rest = &body[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Read a submission record back out of an issue body.
///
/// The fenced JSON block is authoritative. The `key: value` lines are only
/// read when the block is missing or unreadable (e.g. the body was edited
/// by hand).
pub fn parse_issue_body(body: &str) -> Result<SubmissionRecord> {
    let json_error = match fenced_json(body).map(serde_json::from_str::<SubmissionRecord>) {
        Some(Ok(record)) => return Ok(record),
        Some(Err(e)) => Some(e),
        None => None,
    };

    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in body.lines() {
        if line.starts_with("```") {
            break;
        }
        if let Ok((_, (key, value))) = key_value(line) {
            if RECORD_FIELDS.iter().any(|f| *f == key) {
                fields.entry(key).or_insert(value);
            }
        }
    }

    if RECORD_FIELDS.iter().all(|k| fields.contains_key(*k)) {
        let get = |k: &str| fields.get(k).map(|v| v.to_string()).unwrap_or_default();
        return Ok(SubmissionRecord {
            timestamp: get("timestamp"),
            language: get("language"),
            player_name: get("player_name"),
            q2_time: get("Q2_time"),
            q3_time: get("Q3_time"),
            q4_day: get("Q4_day"),
        });
    }

    match json_error {
        Some(e) => Err(SurveyError::IssueBody(format!("raw_json block unreadable: {}", e))),
        None => {
            let missing: Vec<&str> = RECORD_FIELDS
                .iter()
                .copied()
                .filter(|k| !fields.contains_key(*k))
                .collect();
            Err(SurveyError::IssueBody(format!("missing fields: {}", missing.join(", "))))
        }
    }
}
