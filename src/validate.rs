//! Field validators for the contact step.
//!
//! Pure predicates over raw input strings: permissive enough for
//! international phone numbers, strict enough to keep junk out of the CRM.
//! Every validator is total and returns `false` on empty input; invalid
//! input is a normal `false`, never an error.

use regex::Regex;
use std::sync::OnceLock;

fn phone_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Optional +, then digits, spaces allowed only between digits.
    RE.get_or_init(|| Regex::new(r"^\+?[0-9](?:[0-9 ]*[0-9])?$").expect("phone pattern"))
}

fn email_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

/// True iff the trimmed name is at least three characters long.
pub fn valid_name(raw: &str) -> bool {
    raw.trim().chars().count() >= 3
}

/// True iff the trimmed input is an optional `+` followed by 10 to 15
/// digits, spaces between digit groups allowed.
pub fn valid_phone(raw: &str) -> bool {
    let value = raw.trim();
    if !phone_shape().is_match(value) {
        return false;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (10..=15).contains(&digits)
}

/// True iff the input has a `local@domain.tld` shape with no whitespace.
/// The raw string is checked as-is; surrounding whitespace fails.
pub fn valid_email(raw: &str) -> bool {
    email_shape().is_match(raw)
}
