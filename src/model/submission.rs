use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::language::{is_known_language, normalize_language};
use super::question::Question;

pub const MAX_TIMESTAMP_LEN: usize = 64;
pub const MAX_PLAYER_NAME_LEN: usize = 80;

/// Required fields, in the order they are reported when missing
pub const REQUIRED_FIELDS: [&str; 5] = ["player_name", "language", "Q2_time", "Q3_time", "Q4_day"];

/// CSV / issue-body column order
pub const RECORD_FIELDS: [&str; 6] = [
    "timestamp",
    "language",
    "player_name",
    "Q2_time",
    "Q3_time",
    "Q4_day",
];

/// A submission as it arrives on the wire. Every field is optional here;
/// `validate` turns it into a `SubmissionRecord`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(rename = "Q2_time", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub q2_time: Option<String>,
    #[serde(rename = "Q3_time", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub q3_time: Option<String>,
    #[serde(rename = "Q4_day", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub q4_day: Option<String>,
}

/// A validated, normalized survey response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub timestamp: String,
    pub language: String,
    pub player_name: String,
    #[serde(rename = "Q2_time")]
    pub q2_time: String,
    #[serde(rename = "Q3_time")]
    pub q3_time: String,
    #[serde(rename = "Q4_day")]
    pub q4_day: String,
}

/// Client-fixable problems with a payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<&'static str>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing.is_empty() {
            write!(f, "Missing required fields: {}", self.missing.join(", "))
        } else {
            write!(f, "Invalid fields: {}", self.invalid.join(", "))
        }
    }
}

impl std::error::Error for ValidationError {}

impl SubmissionPayload {
    pub fn answer(&self, question: Question) -> Option<&str> {
        match question {
            Question::Q2Time => self.q2_time.as_deref(),
            Question::Q3Time => self.q3_time.as_deref(),
            Question::Q4Day => self.q4_day.as_deref(),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "timestamp" => self.timestamp.as_deref(),
            "language" => self.language.as_deref(),
            "player_name" => self.player_name.as_deref(),
            "Q2_time" => self.q2_time.as_deref(),
            "Q3_time" => self.q3_time.as_deref(),
            "Q4_day" => self.q4_day.as_deref(),
            _ => None,
        }
    }

    /// Names of required fields that are absent or blank after trimming
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| self.field(name).map_or(true, |v| flatten_line(v).trim().is_empty()))
            .collect()
    }

    /// Check the payload once at the boundary and build the typed record.
    ///
    /// `now` stamps submissions that arrive without a timestamp.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<SubmissionRecord, ValidationError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError {
                missing,
                invalid: Vec::new(),
            });
        }

        let mut invalid = Vec::new();

        let language = normalize_language(self.language.as_deref().unwrap_or_default());
        if !is_known_language(&language) {
            invalid.push("language");
        }

        let mut codes = Vec::with_capacity(Question::ALL.len());
        for question in Question::ALL {
            match self.answer(question).and_then(|a| question.answer_code(a)) {
                Some(code) => codes.push(code.to_string()),
                None => {
                    invalid.push(question.key());
                    codes.push(String::new());
                }
            }
        }

        if !invalid.is_empty() {
            return Err(ValidationError {
                missing: Vec::new(),
                invalid,
            });
        }

        let timestamp = match self.timestamp.as_deref().map(|ts| sanitize_text(ts, MAX_TIMESTAMP_LEN)) {
            Some(ts) if !ts.is_empty() => ts,
            _ => now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut codes = codes.into_iter();
        Ok(SubmissionRecord {
            timestamp,
            language,
            player_name: sanitize_text(self.player_name.as_deref().unwrap_or_default(), MAX_PLAYER_NAME_LEN),
            q2_time: codes.next().unwrap_or_default(),
            q3_time: codes.next().unwrap_or_default(),
            q4_day: codes.next().unwrap_or_default(),
        })
    }
}

impl SubmissionRecord {
    /// Field values in `RECORD_FIELDS` order
    pub fn values(&self) -> [&str; 6] {
        [
            self.timestamp.as_str(),
            self.language.as_str(),
            self.player_name.as_str(),
            self.q2_time.as_str(),
            self.q3_time.as_str(),
            self.q4_day.as_str(),
        ]
    }

    pub fn answer(&self, question: Question) -> &str {
        match question {
            Question::Q2Time => &self.q2_time,
            Question::Q3Time => &self.q3_time,
            Question::Q4Day => &self.q4_day,
        }
    }
}

/// Characters that render as nothing but still change string equality
pub fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}')
}

/// One line of text: zero-width characters and carriage returns dropped,
/// any other control character (newline, tab, ...) turned into a space
fn flatten_line(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '\r' && !is_zero_width(*c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Flatten to a single line, trim, and cap the length in characters
pub fn sanitize_text(s: &str, max_len: usize) -> String {
    let text = flatten_line(s);
    let text = text.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut capped: String = text.chars().take(max_len).collect();
    capped.push('…');
    capped
}

/// Accept strings, numbers and booleans; `null` reads as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_payload() -> SubmissionPayload {
        SubmissionPayload {
            timestamp: Some("2025-12-01T10:00:00.000Z".to_string()),
            language: Some("EN".to_string()),
            player_name: Some("  Alice  ".to_string()),
            q2_time: Some("A".to_string()),
            q3_time: Some("e".to_string()),
            q4_day: Some("H. Any day".to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_payload_normalizes() {
        let record = full_payload().validate(now()).unwrap();
        assert_eq!(record.language, "en");
        assert_eq!(record.player_name, "Alice");
        assert_eq!(record.q3_time, "E");
        assert_eq!(record.q4_day, "H");
        assert_eq!(record.timestamp, "2025-12-01T10:00:00.000Z");
    }

    #[test]
    fn test_missing_fields_listed_exactly() {
        let mut payload = full_payload();
        payload.player_name = Some("   ".to_string());
        payload.q3_time = None;
        let err = payload.validate(now()).unwrap_err();
        assert_eq!(err.missing, vec!["player_name", "Q3_time"]);
        assert!(err.invalid.is_empty());

        let err = SubmissionPayload::default().validate(now()).unwrap_err();
        assert_eq!(err.missing, REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn test_invalid_language_and_answer() {
        let mut payload = full_payload();
        payload.language = Some("xx".to_string());
        payload.q2_time = Some("E".to_string());
        let err = payload.validate(now()).unwrap_err();
        assert!(err.missing.is_empty());
        assert_eq!(err.invalid, vec!["language", "Q2_time"]);
    }

    #[test]
    fn test_timestamp_defaults_to_now() {
        let mut payload = full_payload();
        payload.timestamp = None;
        let record = payload.validate(now()).unwrap();
        assert_eq!(record.timestamp, "2025-12-02T00:00:00.000Z");
    }

    #[test]
    fn test_player_name_capped() {
        let mut payload = full_payload();
        payload.player_name = Some("x".repeat(100));
        let record = payload.validate(now()).unwrap();
        assert_eq!(record.player_name.chars().count(), MAX_PLAYER_NAME_LEN + 1);
        assert!(record.player_name.ends_with('…'));
    }

    #[test]
    fn test_sanitize_flattens_to_one_line() {
        assert_eq!(sanitize_text(" a\r\nb \r", 10), "a b");
        assert_eq!(sanitize_text("a\tb\u{7}c", 10), "a b c");
        assert_eq!(sanitize_text("\u{200b}Alice\u{feff}", 10), "Alice");
    }

    #[test]
    fn test_multiline_name_cannot_add_fields() {
        let mut payload = full_payload();
        payload.player_name = Some("Mallory\nQ2_time: Z".to_string());
        payload.timestamp = Some("2025-12-01\nlanguage: xx".to_string());
        let record = payload.validate(now()).unwrap();
        assert_eq!(record.player_name, "Mallory Q2_time: Z");
        assert_eq!(record.timestamp, "2025-12-01 language: xx");
        assert_eq!(record.q2_time, "A");
    }

    #[test]
    fn test_zero_width_name() {
        let mut payload = full_payload();
        payload.player_name = Some("Alice\u{200b}".to_string());
        assert_eq!(payload.validate(now()).unwrap().player_name, "Alice");

        payload.player_name = Some("\u{200b}\u{200c}".to_string());
        assert_eq!(payload.validate(now()).unwrap_err().missing, vec!["player_name"]);
    }

    #[test]
    fn test_lenient_deserialize() {
        let payload: SubmissionPayload = serde_json::from_str(
            r#"{"player_name": 42, "language": null, "Q2_time": "B", "extra": [1]}"#,
        )
        .unwrap();
        assert_eq!(payload.player_name.as_deref(), Some("42"));
        assert_eq!(payload.language, None);
        assert_eq!(payload.q2_time.as_deref(), Some("B"));
    }
}
