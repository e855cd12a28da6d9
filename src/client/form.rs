//! Survey form: prefill, field-level validation and the idle/submitting cycle

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use url::form_urlencoded;

use super::i18n::Messages;
use super::prefs::{PreferenceStore, LANGUAGE_KEY};
use crate::model::{
    is_known_language, language::is_rtl, normalize_language, Question, SubmissionPayload, DEFAULT_LANGUAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

/// Error shown next to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A submission is already in flight
    Busy,
    Invalid(Vec<FieldError>),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Busy => write!(f, "A submission is already in progress"),
            FormError::Invalid(errors) => {
                let parts: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
                write!(f, "{}", parts.join("; "))
            }
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone)]
pub struct SurveyForm {
    language: String,
    pub player_name: String,
    answers: [Option<char>; 3],
    state: FormState,
}

/// Pick the form language: query `lang`, then the stored preference, then English.
/// Unknown codes fall back to English.
pub fn resolve_language(query_lang: Option<&str>, prefs: &dyn PreferenceStore) -> String {
    let candidate = query_lang
        .map(normalize_language)
        .filter(|l| !l.is_empty())
        .or_else(|| prefs.get(LANGUAGE_KEY).map(|l| normalize_language(&l)))
        .unwrap_or_default();

    if is_known_language(&candidate) {
        candidate
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}

fn question_slot(question: Question) -> usize {
    match question {
        Question::Q2Time => 0,
        Question::Q3Time => 1,
        Question::Q4Day => 2,
    }
}

impl SurveyForm {
    pub fn new(language: &str) -> Self {
        let language = normalize_language(language);
        Self {
            language: if is_known_language(&language) { language } else { DEFAULT_LANGUAGE.to_string() },
            player_name: String::new(),
            answers: [None; 3],
            state: FormState::Idle,
        }
    }

    /// Build a form from a query string such as `lang=ja&q02=A&q03=B&q04=C`,
    /// remembering the resolved language.
    pub fn from_query(query: &str, prefs: &mut dyn PreferenceStore) -> Self {
        let params: Vec<(String, String)> = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
        let param = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

        let mut form = Self::new(&resolve_language(param("lang"), &*prefs));
        if let Err(e) = prefs.set(LANGUAGE_KEY, &form.language) {
            log::warn!("Could not store language preference: {}", e);
        }

        if let Some(name) = param("player_name") {
            form.player_name = name.trim().to_string();
        }
        for question in Question::ALL {
            if let Some(value) = param(question.query_key()) {
                if !form.set_answer(question, value) {
                    log::debug!("Ignoring prefill {}={}", question.query_key(), value);
                }
            }
        }

        form
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switch language; unknown codes are refused
    pub fn set_language(&mut self, code: &str, prefs: &mut dyn PreferenceStore) -> bool {
        let code = normalize_language(code);
        if !is_known_language(&code) {
            return false;
        }
        if let Err(e) = prefs.set(LANGUAGE_KEY, &code) {
            log::warn!("Could not store language preference: {}", e);
        }
        self.language = code;
        true
    }

    /// Text direction for the current language
    pub fn direction(&self) -> &'static str {
        if is_rtl(&self.language) {
            "rtl"
        } else {
            "ltr"
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn answer(&self, question: Question) -> Option<char> {
        self.answers[question_slot(question)]
    }

    /// Select an answer; values that match no option leave the field unchanged
    pub fn set_answer(&mut self, question: Question, raw: &str) -> bool {
        match question.answer_code(raw) {
            Some(code) => {
                self.answers[question_slot(question)] = Some(code);
                true
            }
            None => false,
        }
    }

    /// Check every field; nothing is sent unless all are filled
    pub fn validate(&self, messages: &Messages) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.player_name.trim().is_empty() {
            errors.push(FieldError {
                field: "player_name",
                message: messages.text("error_required", "Required"),
            });
        }
        for question in Question::ALL {
            if self.answer(question).is_none() {
                errors.push(FieldError {
                    field: question.key(),
                    message: messages.text("error_select_one", "Please select one option."),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and enter `Submitting`, returning the payload to send
    pub fn begin_submit(&mut self, messages: &Messages, now: DateTime<Utc>) -> Result<SubmissionPayload, FormError> {
        if self.state == FormState::Submitting {
            return Err(FormError::Busy);
        }
        self.validate(messages).map_err(FormError::Invalid)?;

        self.state = FormState::Submitting;
        let code = |q: Question| self.answer(q).map(|c| c.to_string());
        Ok(SubmissionPayload {
            timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            language: Some(self.language.clone()),
            player_name: Some(self.player_name.trim().to_string()),
            q2_time: code(Question::Q2Time),
            q3_time: code(Question::Q3Time),
            q4_day: code(Question::Q4Day),
        })
    }

    /// Back to `Idle`. A successful submission clears the answers but keeps the language.
    pub fn finish(&mut self, succeeded: bool) {
        self.state = FormState::Idle;
        if succeeded {
            self.player_name.clear();
            self.answers = [None; 3];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::prefs::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_prefill_from_query() {
        let mut prefs = MemoryStore::default();
        let form = SurveyForm::from_query("?lang=JA&q02=A&q03=b&q04=Z&player_name=%20Ken%20", &mut prefs);

        assert_eq!(form.language(), "ja");
        assert_eq!(form.answer(Question::Q2Time), Some('A'));
        assert_eq!(form.answer(Question::Q3Time), Some('B'));
        // out of range for Q4
        assert_eq!(form.answer(Question::Q4Day), None);
        assert_eq!(form.player_name, "Ken");
        assert_eq!(prefs.get(LANGUAGE_KEY).as_deref(), Some("ja"));
    }

    #[test]
    fn test_language_resolution_order() {
        let mut prefs = MemoryStore::default();
        assert_eq!(resolve_language(None, &prefs), "en");

        prefs.set(LANGUAGE_KEY, "de").unwrap();
        assert_eq!(resolve_language(None, &prefs), "de");
        assert_eq!(resolve_language(Some("fr"), &prefs), "fr");
        assert_eq!(resolve_language(Some("  "), &prefs), "de");
        assert_eq!(resolve_language(Some("xx"), &prefs), "en");
    }

    #[test]
    fn test_validation_blocks_incomplete_form() {
        let mut form = SurveyForm::new("en");
        form.set_answer(Question::Q2Time, "A");

        let err = form.begin_submit(&Messages::defaults(), now()).unwrap_err();
        match err {
            FormError::Invalid(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["player_name", "Q3_time", "Q4_day"]);
                assert_eq!(errors[1].message, "Please select one option.");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_submit_cycle() {
        let mut form = SurveyForm::new("ar");
        form.player_name = "Layla".to_string();
        form.set_answer(Question::Q2Time, "D");
        form.set_answer(Question::Q3Time, "E");
        form.set_answer(Question::Q4Day, "Friday");
        assert_eq!(form.direction(), "rtl");

        let payload = form.begin_submit(&Messages::defaults(), now()).unwrap();
        assert_eq!(form.state(), FormState::Submitting);
        assert_eq!(payload.q4_day.as_deref(), Some("E"));
        assert_eq!(payload.timestamp.as_deref(), Some("2025-12-01T09:30:00.000Z"));

        // a second submit while one is in flight is refused
        assert!(matches!(
            form.begin_submit(&Messages::defaults(), now()),
            Err(FormError::Busy)
        ));

        form.finish(false);
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.answer(Question::Q2Time), Some('D'));

        form.begin_submit(&Messages::defaults(), now()).unwrap();
        form.finish(true);
        assert_eq!(form.answer(Question::Q2Time), None);
        assert!(form.player_name.is_empty());
        assert_eq!(form.language(), "ar");
    }

    #[test]
    fn test_set_language() {
        let mut prefs = MemoryStore::default();
        let mut form = SurveyForm::new("en");
        assert!(!form.set_language("xx", &mut prefs));
        assert!(form.set_language("zh-Hant", &mut prefs));
        assert_eq!(form.language(), "zh-hant");
        assert_eq!(prefs.get(LANGUAGE_KEY).as_deref(), Some("zh-hant"));
    }
}
