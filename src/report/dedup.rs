//! Latest-submission-per-player view of the raw export

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;

use super::csv_loader::CsvRow;
use crate::model::{is_zero_width, SubmissionRecord};

/// A player's most recent submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Respondent {
    /// Normalized player name used for grouping
    pub key: String,
    /// Data-row index of the chosen row
    pub index: usize,
    pub submitted_at: DateTime<Utc>,
    pub record: SubmissionRecord,
    /// Number of rows seen for this player
    pub submissions: usize,
}

/// Grouping key for a player name
pub fn normalize_player_name(name: &str) -> String {
    let visible: String = name.chars().filter(|c| !is_zero_width(*c)).collect();
    visible.trim().to_string()
}

/// Parse a submission timestamp; anything unreadable counts as the epoch
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_utc();
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return naive.and_utc();
    }

    DateTime::<Utc>::UNIX_EPOCH
}

/// Keep one row per non-empty player: the latest timestamp, and on a tie
/// the row that came later in the file.
///
/// Respondents are returned in order of each player's first appearance.
pub fn latest_per_player(rows: &[CsvRow]) -> Vec<Respondent> {
    let mut respondents: Vec<Respondent> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = normalize_player_name(&row.record.player_name);
        if key.is_empty() {
            continue;
        }
        let submitted_at = parse_timestamp(&row.record.timestamp);

        match by_key.get(&key) {
            Some(&slot) => {
                let current = &mut respondents[slot];
                current.submissions += 1;
                let newer = (submitted_at, row.index) >= (current.submitted_at, current.index);
                if newer {
                    current.index = row.index;
                    current.submitted_at = submitted_at;
                    current.record = row.record.clone();
                }
            }
            None => {
                by_key.insert(key.clone(), respondents.len());
                respondents.push(Respondent {
                    key,
                    index: row.index,
                    submitted_at,
                    record: row.record.clone(),
                    submissions: 1,
                });
            }
        }
    }

    respondents
}
