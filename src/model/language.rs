/// Language codes accepted by the survey, in report order.
pub const LANGUAGES: [(&str, &str); 19] = [
    ("en", "English"),
    ("de", "Deutsch"),
    ("nl", "Nederlands"),
    ("fr", "Français"),
    ("ru", "Русский"),
    ("es", "Español"),
    ("pt", "Português"),
    ("it", "Italiano"),
    ("zh-hans", "简体中文"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("zh-hant", "繁體中文"),
    ("ar", "العربية"),
    ("th", "ไทย"),
    ("vi", "Tiếng Việt"),
    ("tr", "Türkçe"),
    ("pl", "Polski"),
    ("ms", "Bahasa Melayu"),
    ("id", "Bahasa Indonesia"),
];

pub const DEFAULT_LANGUAGE: &str = "en";

/// Normalize a language code: trimmed and lower-cased
pub fn normalize_language(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Check a (normalized) code against the allow-list
pub fn is_known_language(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Position of a code in the allow-list, if known
pub fn language_rank(code: &str) -> Option<usize> {
    LANGUAGES.iter().position(|(c, _)| *c == code)
}

/// Display label for a code; unknown codes are shown as-is
pub fn language_label(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Right-to-left scripts in the allow-list
pub fn is_rtl(code: &str) -> bool {
    code == "ar"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mixed_case() {
        assert_eq!(normalize_language("  zh-Hans "), "zh-hans");
        assert!(is_known_language(&normalize_language("zh-Hant")));
    }

    #[test]
    fn test_unknown_code() {
        assert!(!is_known_language("xx"));
        assert_eq!(language_label("xx"), "xx");
        assert_eq!(language_rank("xx"), None);
    }

    #[test]
    fn test_rank_follows_allow_list() {
        assert_eq!(language_rank("en"), Some(0));
        assert_eq!(language_rank("id"), Some(18));
        assert_eq!(language_label("ja"), "日本語");
    }
}
