//! Per-question and per-language counts over respondents

use std::collections::HashMap;

use super::dedup::Respondent;
use crate::model::{language_label, language::language_rank, normalize_language, Bucket, Question, SubmissionRecord};

/// Count for one option of a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub bucket: Bucket,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTally {
    pub question: Question,
    pub counts: Vec<OptionCount>,
    pub total: usize,
}

impl QuestionTally {
    pub fn count_for(&self, bucket: Bucket) -> usize {
        self.counts
            .iter()
            .find(|c| c.bucket == bucket)
            .map_or(0, |c| c.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCount {
    pub code: String,
    pub label: String,
    /// False for codes outside the allow-list (reported as "Other")
    pub known: bool,
    pub count: usize,
}

/// Everything the report renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub respondents: usize,
    pub questions: Vec<QuestionTally>,
    pub languages: Vec<LanguageCount>,
}

const UNKNOWN_LANGUAGE: &str = "unknown";

/// Tally one question in option order, with `Other` last and only if used
pub fn tally_question<'a, I>(question: Question, records: I) -> QuestionTally
where
    I: IntoIterator<Item = &'a SubmissionRecord>,
{
    let mut by_bucket: HashMap<Bucket, usize> = HashMap::new();
    let mut total = 0;
    for record in records {
        *by_bucket.entry(question.canonicalize(record.answer(question))).or_insert(0) += 1;
        total += 1;
    }

    let mut counts: Vec<OptionCount> = question
        .options()
        .iter()
        .map(|option| OptionCount {
            bucket: Bucket::Option(option.code),
            label: option.label(),
            count: by_bucket.get(&Bucket::Option(option.code)).copied().unwrap_or(0),
        })
        .collect();

    let other = by_bucket.get(&Bucket::Other).copied().unwrap_or(0);
    if other > 0 {
        counts.push(OptionCount {
            bucket: Bucket::Other,
            label: "Other".to_string(),
            count: other,
        });
    }

    QuestionTally { question, counts, total }
}

/// Known languages in allow-list order, then unknown codes by descending count
pub fn tally_languages<'a, I>(records: I) -> Vec<LanguageCount>
where
    I: IntoIterator<Item = &'a SubmissionRecord>,
{
    let mut by_code: HashMap<String, usize> = HashMap::new();
    for record in records {
        let mut code = normalize_language(&record.language);
        if code.is_empty() {
            code = UNKNOWN_LANGUAGE.to_string();
        }
        *by_code.entry(code).or_insert(0) += 1;
    }

    let (mut known, mut unknown): (Vec<_>, Vec<_>) = by_code
        .into_iter()
        .partition(|(code, _)| language_rank(code).is_some());

    known.sort_by_key(|(code, _)| language_rank(code));
    unknown.sort_by(|(a_code, a_count), (b_code, b_count)| b_count.cmp(a_count).then_with(|| a_code.cmp(b_code)));

    let known = known.into_iter().map(|(code, count)| LanguageCount {
        label: language_label(&code).to_string(),
        code,
        known: true,
        count,
    });
    let unknown = unknown.into_iter().map(|(code, count)| LanguageCount {
        label: format!("Other ({})", code),
        code,
        known: false,
        count,
    });

    known.chain(unknown).collect()
}

pub fn summarize(respondents: &[Respondent]) -> Summary {
    let records: Vec<&SubmissionRecord> = respondents.iter().map(|r| &r.record).collect();

    Summary {
        respondents: records.len(),
        questions: Question::ALL
            .iter()
            .map(|q| tally_question(*q, records.iter().copied()))
            .collect(),
        languages: tally_languages(records.iter().copied()),
    }
}
