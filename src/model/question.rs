//! Fixed-option survey questions and answer canonicalization

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    /// Leading ASCII or fullwidth letter followed by a separator (or nothing)
    static ref LEADING_CODE: Regex =
        Regex::new(r"^([A-Za-zＡ-Ｚａ-ｚ])(?:[\s.．:：)）、,，\-/]|$)").unwrap();
}

/// One selectable option of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOption {
    pub code: char,
    pub text: &'static str,
}

impl AnswerOption {
    /// Human-readable canonical label, e.g. "A. Monday"
    pub fn label(&self) -> String {
        format!("{}. {}", self.code, self.text)
    }
}

const Q2_OPTIONS: &[AnswerOption] = &[
    AnswerOption { code: 'A', text: "00:00-05:59 UTC" },
    AnswerOption { code: 'B', text: "06:00-11:59 UTC" },
    AnswerOption { code: 'C', text: "12:00-17:59 UTC" },
    AnswerOption { code: 'D', text: "18:00-23:59 UTC" },
];

const Q3_OPTIONS: &[AnswerOption] = &[
    AnswerOption { code: 'A', text: "30 minutes" },
    AnswerOption { code: 'B', text: "1 hour" },
    AnswerOption { code: 'C', text: "2 hours" },
    AnswerOption { code: 'D', text: "3 hours or more" },
    AnswerOption { code: 'E', text: "No preference" },
];

const Q4_OPTIONS: &[AnswerOption] = &[
    AnswerOption { code: 'A', text: "Monday" },
    AnswerOption { code: 'B', text: "Tuesday" },
    AnswerOption { code: 'C', text: "Wednesday" },
    AnswerOption { code: 'D', text: "Thursday" },
    AnswerOption { code: 'E', text: "Friday" },
    AnswerOption { code: 'F', text: "Saturday" },
    AnswerOption { code: 'G', text: "Sunday" },
    AnswerOption { code: 'H', text: "Any day" },
];

/// The three single-choice questions of the survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    Q2Time,
    Q3Time,
    Q4Day,
}

/// Result of mapping a raw answer onto a question's options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Option(char),
    Other,
}

impl Question {
    pub const ALL: [Question; 3] = [Question::Q2Time, Question::Q3Time, Question::Q4Day];

    /// Field name used on the wire and in the CSV header
    pub fn key(&self) -> &'static str {
        match self {
            Question::Q2Time => "Q2_time",
            Question::Q3Time => "Q3_time",
            Question::Q4Day => "Q4_day",
        }
    }

    /// Query-string parameter used to prefill this question
    pub fn query_key(&self) -> &'static str {
        match self {
            Question::Q2Time => "q02",
            Question::Q3Time => "q03",
            Question::Q4Day => "q04",
        }
    }

    pub fn options(&self) -> &'static [AnswerOption] {
        match self {
            Question::Q2Time => Q2_OPTIONS,
            Question::Q3Time => Q3_OPTIONS,
            Question::Q4Day => Q4_OPTIONS,
        }
    }

    pub fn option(&self, code: char) -> Option<&'static AnswerOption> {
        self.options().iter().find(|o| o.code == code)
    }

    /// Map a raw answer to its bucket.
    ///
    /// A leading letter code wins; then an exact (case-insensitive) match
    /// against the full or bare option label; anything else is `Other`.
    pub fn canonicalize(&self, raw: &str) -> Bucket {
        let answer = raw.trim();
        if answer.is_empty() {
            return Bucket::Other;
        }

        if let Some(code) = leading_code(answer) {
            if self.option(code).is_some() {
                return Bucket::Option(code);
            }
        }

        let lowered = answer.to_lowercase();
        self.options()
            .iter()
            .find(|o| o.text.to_lowercase() == lowered || o.label().to_lowercase() == lowered)
            .map(|o| Bucket::Option(o.code))
            .unwrap_or(Bucket::Other)
    }

    /// Canonical answer code, or `None` when the answer matches no option
    pub fn answer_code(&self, raw: &str) -> Option<char> {
        match self.canonicalize(raw) {
            Bucket::Option(code) => Some(code),
            Bucket::Other => None,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Extract a leading letter code, normalized to uppercase ASCII
fn leading_code(answer: &str) -> Option<char> {
    let caps = LEADING_CODE.captures(answer)?;
    let c = caps.get(1)?.as_str().chars().next()?;
    let ascii = match c {
        'Ａ'..='Ｚ' => char::from_u32(c as u32 - 'Ａ' as u32 + 'A' as u32)?,
        'ａ'..='ｚ' => char::from_u32(c as u32 - 'ａ' as u32 + 'A' as u32)?,
        _ => c.to_ascii_uppercase(),
    };
    Some(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_variants_share_bucket() {
        let q = Question::Q4Day;
        assert_eq!(q.canonicalize("A. Monday"), Bucket::Option('A'));
        assert_eq!(q.canonicalize("a"), Bucket::Option('A'));
        assert_eq!(q.canonicalize("A"), Bucket::Option('A'));
    }

    #[test]
    fn test_fullwidth_letter() {
        assert_eq!(Question::Q4Day.canonicalize("Ｃ．水曜日"), Bucket::Option('C'));
        assert_eq!(Question::Q4Day.canonicalize("ｈ）"), Bucket::Option('H'));
    }

    #[test]
    fn test_label_fallback() {
        // "Any day" starts with a letter but no separator follows it
        assert_eq!(Question::Q4Day.canonicalize("Any day"), Bucket::Option('H'));
        assert_eq!(Question::Q4Day.canonicalize("friday"), Bucket::Option('E'));
        assert_eq!(Question::Q3Time.canonicalize("E. No preference"), Bucket::Option('E'));
    }

    #[test]
    fn test_out_of_range_letter_is_other() {
        assert_eq!(Question::Q2Time.canonicalize("E"), Bucket::Other);
        assert_eq!(Question::Q2Time.canonicalize("Z: whenever"), Bucket::Other);
        assert_eq!(Question::Q2Time.canonicalize(""), Bucket::Other);
        assert_eq!(Question::Q2Time.answer_code("banana"), None);
    }

    #[test]
    fn test_keys() {
        assert_eq!(Question::Q2Time.key(), "Q2_time");
        assert_eq!(Question::Q4Day.query_key(), "q04");
        assert_eq!(Question::Q3Time.options().len(), 5);
    }
}
