/// Boundary input validation.
///
/// Request bodies are deserialized into typed structs and validated here
/// before any token or store work runs. Invalid shapes fail with a 400
/// without ever reaching the auth components.

use lazy_static::lazy_static;
use regex::Regex;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 100;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    SuspiciousContent(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates and normalizes an email address.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }
    // Local part longer than 64 octets is a phishing tell
    if let Some(at_pos) = trimmed.find('@') {
        if trimmed[..at_pos].len() > 64 {
            return Err(ValidationError::SuspiciousContent("email"));
        }
    }

    Ok(trimmed.to_lowercase())
}

/// Validates a display name.
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }
    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_emails() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn normalizes_email_case_and_whitespace() {
        assert_eq!(
            is_valid_email("  User@Example.COM ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(is_valid_email("notanemail").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("").is_err());
    }

    #[test]
    fn rejects_oversized_emails() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
        assert!(is_valid_email("a@a.c").is_err());
    }

    #[test]
    fn rejects_oversized_local_part() {
        let email = format!("{}@example.com", "a".repeat(65));
        assert_eq!(
            is_valid_email(&email),
            Err(ValidationError::SuspiciousContent("email"))
        );
    }

    #[test]
    fn accepts_common_names() {
        assert!(is_valid_name("John Doe").is_ok());
        assert!(is_valid_name("Jean-Pierre").is_ok());
        assert!(is_valid_name("O'Brien").is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_names() {
        assert!(is_valid_name("").is_err());
        assert!(is_valid_name("   ").is_err());
        assert!(is_valid_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn rejects_control_characters_in_names() {
        assert!(is_valid_name("Name\0with\0null").is_err());
        assert!(is_valid_name("line\nbreak").is_err());
    }
}
