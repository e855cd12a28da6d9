use chrono::{DateTime, Utc};

use super::dedup::Respondent;
use crate::model::normalize_language;

/// Report filters; an unset field matches everything
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub language: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub name_contains: Option<String>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.since.is_none() && self.until.is_none() && self.name_contains.is_none()
    }

    pub fn matches(&self, respondent: &Respondent) -> bool {
        if let Some(lang) = &self.language {
            if normalize_language(&respondent.record.language) != normalize_language(lang) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if respondent.submitted_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if respondent.submitted_at > until {
                return false;
            }
        }
        if let Some(needle) = &self.name_contains {
            if !respondent.key.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Filter respondents (after dedup, so a player's older rows never resurface)
    pub fn apply(&self, respondents: Vec<Respondent>) -> Vec<Respondent> {
        if self.is_empty() {
            return respondents;
        }
        respondents.into_iter().filter(|r| self.matches(r)).collect()
    }
}
