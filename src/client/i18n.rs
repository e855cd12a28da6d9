//! Translation table loaded from a TSV file (`key<TAB>en<TAB>de...`)

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SurveyError};
use crate::model::{normalize_language, DEFAULT_LANGUAGE};

#[derive(Debug, Clone, Default)]
pub struct Translations {
    languages: Vec<String>,
    entries: HashMap<String, HashMap<String, String>>,
}

impl Translations {
    /// Parse TSV text. The first column of the header must be `key`;
    /// the remaining header cells are language codes.
    pub fn parse_tsv(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header: Vec<&str> = match lines.next() {
            Some(line) => line.split('\t').map(str::trim).collect(),
            None => return Err(SurveyError::Parse("translations file is empty".to_string())),
        };
        if header.first().map(|h| h.trim_start_matches('\u{feff}')) != Some("key") {
            return Err(SurveyError::Parse("translations header must start with \"key\"".to_string()));
        }

        let languages: Vec<String> = header[1..].iter().map(|l| normalize_language(l)).collect();
        let mut entries = HashMap::new();

        for line in lines {
            let cols: Vec<&str> = line.split('\t').collect();
            let key = cols.first().map(|k| k.trim()).unwrap_or_default();
            if key.is_empty() {
                continue;
            }

            let texts: HashMap<String, String> = languages
                .iter()
                .enumerate()
                .map(|(i, lang)| (lang.clone(), cols.get(i + 1).copied().unwrap_or("").to_string()))
                .collect();
            entries.insert(key.to_string(), texts);
        }

        Ok(Self { languages, entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_tsv(&text)
    }

    /// Language codes present in the header, normalized
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text for `key` in `lang`, falling back to English; blank cells count as missing
    pub fn get(&self, key: &str, lang: &str) -> Option<&str> {
        let entry = self.entries.get(key)?;
        let lang = normalize_language(lang);
        [lang.as_str(), DEFAULT_LANGUAGE]
            .iter()
            .filter_map(|l| entry.get(*l))
            .map(String::as_str)
            .find(|t| !t.is_empty())
    }
}

/// Message lookup for one language, with built-in English defaults
#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    translations: Option<&'a Translations>,
    lang: &'a str,
}

impl<'a> Messages<'a> {
    pub fn new(translations: Option<&'a Translations>, lang: &'a str) -> Self {
        Self { translations, lang }
    }

    /// English defaults only
    pub fn defaults() -> Messages<'static> {
        Messages {
            translations: None,
            lang: DEFAULT_LANGUAGE,
        }
    }

    pub fn text(&self, key: &str, default: &str) -> String {
        self.translations
            .and_then(|t| t.get(key, self.lang))
            .unwrap_or(default)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "key\ten\tja\tzh-Hans\n\
                       title\tEvent Survey\tイベントアンケート\t活动调查\n\
                       submit\tSubmit\t\t提交\n\
                       \n\
                       only_en\tEnglish only\n";

    #[test]
    fn test_parse_and_lookup() {
        let t = Translations::parse_tsv(TSV).unwrap();
        assert_eq!(t.languages(), &["en", "ja", "zh-hans"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("title", "ja"), Some("イベントアンケート"));
        assert_eq!(t.get("title", "zh-Hans"), Some("活动调查"));
    }

    #[test]
    fn test_falls_back_to_english() {
        let t = Translations::parse_tsv(TSV).unwrap();
        assert_eq!(t.get("submit", "ja"), Some("Submit"));
        assert_eq!(t.get("only_en", "zh-hans"), Some("English only"));
        assert_eq!(t.get("title", "ko"), Some("Event Survey"));
        assert_eq!(t.get("nope", "en"), None);
    }

    #[test]
    fn test_header_must_start_with_key() {
        assert!(Translations::parse_tsv("id\ten\nx\ty\n").is_err());
        assert!(Translations::parse_tsv("\n\n").is_err());
    }

    #[test]
    fn test_messages_default_when_untranslated() {
        let t = Translations::parse_tsv(TSV).unwrap();
        let ja = Messages::new(Some(&t), "ja");
        assert_eq!(ja.text("title", "x"), "イベントアンケート");
        assert_eq!(ja.text("missing", "Fallback"), "Fallback");
        assert_eq!(Messages::defaults().text("title", "Default"), "Default");
    }
}
