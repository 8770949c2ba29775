//! Name cleanup for file names.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_STUDENT_NAME: &str = "nome_do_aluno";

const INVALID_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Decomposes to NFD and drops every combining mark.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Makes a display name safe to use as a file name stem.
/// Never used on the text written into the documents themselves.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = strip_diacritics(name)
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if sanitized.is_empty() {
        FALLBACK_STUDENT_NAME.to_string()
    } else {
        sanitized
    }
}

/// Collapses newlines, carriage returns and whitespace runs into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("João Conceição"), "Joao Conceicao");
        assert_eq!(strip_diacritics("Ünïcödé"), "Unicode");
        assert_eq!(strip_diacritics("plain"), "plain");
    }

    #[test]
    fn test_strip_diacritics_leaves_no_combining_marks() {
        let input = "e\u{0301}a\u{0300}o\u{0303}\u{0327}";
        let output = strip_diacritics(input);
        assert!(!output.chars().any(is_combining_mark));
        assert_eq!(output, "eao");
    }

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        let output = sanitize_filename(r#"Ana/Maria \ Sá*?: "Silva" <x> |y|"#);
        for c in INVALID_FILENAME_CHARS {
            assert!(!output.contains(*c));
        }
        assert!(!output.contains("  "));
        assert_eq!(output, "AnaMaria Sa Silva x y");
    }

    #[test]
    fn test_sanitize_filename_collapses_whitespace() {
        assert_eq!(sanitize_filename("  Bruno \t\n  Costa  "), "Bruno Costa");
    }

    #[test]
    fn test_sanitize_filename_falls_back_when_empty() {
        assert_eq!(sanitize_filename(""), FALLBACK_STUDENT_NAME);
        assert_eq!(sanitize_filename(r#" /\*?:"<>| "#), FALLBACK_STUDENT_NAME);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("Ana\r\nda   Silva\n"), "Ana da Silva");
    }
}
