//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// WhatsApp-style identifier: optional '+', no leading zero, 7-15 digits (E.164 body)
static PHONE_IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[1-9]\d{6,14}$").expect("phone identifier regex is valid")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a string is usable as an OTP identifier
///
/// Accepts international numbers with or without the leading '+', the way the
/// WhatsApp Cloud API addresses recipients.
pub fn is_valid_phone_identifier(phone: &str) -> bool {
    PHONE_IDENTIFIER_REGEX.is_match(phone)
}

/// Mask a phone number for logging, keeping only the last 4 characters
///
/// Works on `char`s so any identifier can be masked, not only ASCII digits.
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let visible_digits = 4;
    if chars.len() <= visible_digits {
        return "*".repeat(chars.len());
    }

    let masked_count = chars.len() - visible_digits;
    let last_digits: String = chars[masked_count..].iter().collect();

    if chars[0] == '+' {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}
