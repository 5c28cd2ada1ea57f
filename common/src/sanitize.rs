//! Folder-name sanitizer
//!
//! Free-text geography and grouping strings become filesystem-safe tokens:
//! diacritics stripped, spaces to underscores, everything outside
//! `[A-Za-z0-9_]` removed.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Clean a free-text value for use as a folder name.
///
/// Returns `None` for empty input and for input that cleans down to nothing.
///
/// # Examples
/// ```
/// use specimen_intake_common::clean_folder_name;
///
/// assert_eq!(clean_folder_name("Mañana Ko'olau").as_deref(), Some("Manana_Koolau"));
/// assert_eq!(clean_folder_name(""), None);
/// ```
pub fn clean_folder_name(name: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref DISALLOWED: Regex = Regex::new(r"[^a-zA-Z0-9_]").unwrap();
    }

    if name.is_empty() {
        return None;
    }

    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let underscored = ascii.replace(' ', "_");
    let cleaned = DISALLOWED.replace_all(&underscored, "").into_owned();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// `clean_folder_name` over an optional value
pub fn clean_opt(name: Option<&str>) -> Option<String> {
    name.and_then(clean_folder_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics_and_punctuation() {
        assert_eq!(clean_folder_name("Mañana Ko'olau").as_deref(), Some("Manana_Koolau"));
        assert_eq!(clean_folder_name("Hawaiʻi").as_deref(), Some("Hawaii"));
        assert_eq!(clean_folder_name("São Tomé").as_deref(), Some("Sao_Tome"));
    }

    #[test]
    fn test_empty_and_unusable() {
        assert_eq!(clean_folder_name(""), None);
        assert_eq!(clean_folder_name("!!!"), None);
        assert_eq!(clean_opt(None), None);
    }

    #[test]
    fn test_keeps_safe_text() {
        assert_eq!(clean_folder_name("Oahu_01").as_deref(), Some("Oahu_01"));
        assert_eq!(clean_folder_name("Mt. Ka'ala, summit").as_deref(), Some("Mt_Kaala_summit"));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Mañana Ko'olau",
            "  leading spaces",
            "Ñandú / Río",
            "tabs\tand-dashes",
            "Kīpuka Puaulu (upper)",
            "ÆØÅ",
            "123 abc",
        ];
        for sample in samples {
            let once = clean_folder_name(sample);
            let twice = once.as_deref().and_then(clean_folder_name);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}
