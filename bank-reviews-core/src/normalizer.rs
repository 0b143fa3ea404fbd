//! Text cleaning shared by every stage.
//!
//! `is_english` is a cheap proxy rather than language identification: it
//! only looks at the share of ASCII letters. Transliterated Amharic or
//! Arabic written in Latin script passes as English, and English text heavy
//! with accented characters or emoji can be rejected.

pub const MIN_TEXT_LENGTH: usize = 3;
pub const ENGLISH_ASCII_THRESHOLD: f64 = 0.7;

pub fn is_english(text: &str) -> bool {
    if text.chars().count() < MIN_TEXT_LENGTH {
        return false;
    }

    let mut letters = 0usize;
    let mut visible = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        visible += 1;
        if c.is_ascii_alphabetic() {
            letters += 1;
        }
    }

    visible > 0 && (letters as f64) / (visible as f64) > ENGLISH_ASCII_THRESHOLD
}

/// Collapses whitespace runs (newlines and tabs included) into single spaces.
pub fn clean_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased text reduced to ASCII letters separated by single spaces.
/// Digits and punctuation are dropped without leaving a gap, so `can't`
/// becomes `cant`.
pub fn preprocess_text(text: &str) -> String {
    let letters: String = text.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    clean_whitespace(&letters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_text_is_detected() {
        assert!(is_english("This is a great app!"));
        assert!(is_english("The login works perfectly."));
        assert!(is_english("Good app with some issues"));
    }

    #[test]
    fn non_latin_scripts_are_rejected() {
        assert!(!is_english("ይህ መተግበሪያ በጣም ጥሩ ነው"));
        assert!(!is_english("هذا التطبيق رائع"));
    }

    #[test]
    fn short_or_empty_text_is_rejected() {
        assert!(!is_english(""));
        assert!(!is_english("a"));
        assert!(!is_english("ab"));
        assert!(!is_english("   "));
    }

    #[test]
    fn digits_and_symbols_are_rejected() {
        assert!(!is_english("12345"));
        assert!(!is_english("!@#$%"));
    }

    #[test]
    fn ascii_share_must_exceed_threshold() {
        // 7 of 10 visible characters are letters
        assert!(!is_english("abcdefg123"));
        // 8 of 11
        assert!(is_english("abcdefgh123"));
        // whitespace is not counted
        assert!(!is_english("abc defg 123"));
    }

    #[test]
    fn transliterated_text_passes_the_heuristic() {
        // known limitation: Amharic written in Latin script looks English
        assert!(is_english("betam tiru app new"));
    }

    #[test]
    fn clean_whitespace_collapses_runs() {
        assert_eq!(clean_whitespace("This   is   a   test"), "This is a test");
        assert_eq!(clean_whitespace("Hello\n\nWorld"), "Hello World");
        assert_eq!(clean_whitespace("  Trimmed  "), "Trimmed");
    }

    #[test]
    fn preprocess_lowercases_and_strips() {
        assert_eq!(preprocess_text("HELLO WORLD"), "hello world");
        assert_eq!(preprocess_text("Hello! How are you?"), "hello how are you");
        assert_eq!(preprocess_text("Version 1.2.3 released"), "version released");
        assert_eq!(preprocess_text("Hello    World"), "hello world");
        assert_eq!(preprocess_text("I can't login"), "i cant login");
        assert_eq!(preprocess_text(""), "");
    }

    #[test]
    fn preprocess_drops_non_ascii_letters() {
        assert_eq!(preprocess_text("Login 登录 تسجيل الدخول"), "login");
    }

    #[test]
    fn preprocess_is_idempotent() {
        for text in ["Login is SLOW!!! 2 days...", "  a\tb\nc ", "Café déjà vu", ""] {
            let once = preprocess_text(text);
            assert_eq!(preprocess_text(&once), once);
        }
    }
}
