//! Pattern extraction and password classification.

use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // +7 or 8 prefix, then area/prefix/line segments with optional
        // separators and parentheses around the area code.
        Regex::new(r"(?:\+7|\b8)[ -]?\(?(\d{3})\)?[ -]?(\d{3})[ -]?(\d{2})[ -]?(\d{2})\b")
            .expect("phone pattern")
    })
}

/// Find all email addresses in `text`, in order of appearance.
pub fn find_emails(text: &str) -> Vec<String> {
    email_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Find all phone numbers in `text`, each re-joined from its four captured
/// segments with single spaces (e.g. "912 345 67 89").
pub fn find_phone_numbers(text: &str) -> Vec<String> {
    phone_regex()
        .captures_iter(text)
        .map(|c| format!("{} {} {} {}", &c[1], &c[2], &c[3], &c[4]))
        .collect()
}

const SPECIAL_CHARS: &str = "@$!%*?&";

/// Classify a password as strong.
///
/// Strong means: at least 8 characters, all drawn from ASCII letters,
/// digits and `@$!%*?&`, with at least one lowercase letter, one uppercase
/// letter, one digit and one special character.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SPECIAL_CHARS.contains(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_emails_in_order() {
        assert_eq!(
            find_emails("contact a@b.com or c@d.org"),
            vec!["a@b.com", "c@d.org"]
        );
    }

    #[test]
    fn ignores_text_without_emails() {
        assert!(find_emails("nothing to see here").is_empty());
        assert!(find_emails("almost@an@email").is_empty());
    }

    #[test]
    fn finds_phone_numbers_with_plus_seven_prefix() {
        assert_eq!(
            find_phone_numbers("+7 912 345 67 89"),
            vec!["912 345 67 89"]
        );
    }

    #[test]
    fn finds_phone_numbers_in_common_formats() {
        assert_eq!(find_phone_numbers("8 (912) 345-67-89"), vec!["912 345 67 89"]);
        assert_eq!(find_phone_numbers("89123456789"), vec!["912 345 67 89"]);
        assert_eq!(
            find_phone_numbers("call +7-912-345-67-89 today"),
            vec!["912 345 67 89"]
        );
    }

    #[test]
    fn ignores_text_without_phone_numbers() {
        assert!(find_phone_numbers("no numbers at all").is_empty());
        assert!(find_phone_numbers("12345").is_empty());
    }

    #[test]
    fn strong_password_accepted() {
        assert!(is_strong_password("Abc12345!"));
        assert!(is_strong_password("P@ssw0rd"));
    }

    #[test]
    fn weak_passwords_rejected() {
        assert!(!is_strong_password(""));
        assert!(!is_strong_password("abcdefgh"));
        assert!(!is_strong_password("ABCDEFG1"));
        assert!(!is_strong_password("Ab1!"));
        // Special character outside the allowed set.
        assert!(!is_strong_password("Abc12345#"));
    }
}
