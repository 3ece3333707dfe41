/// Password hashing and verification, backed by bcrypt.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;
use crate::validators::ValidationError;

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Length policy, checked at the boundary before a registration is
/// accepted and again before hashing.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password",
            MIN_PASSWORD_LENGTH,
        )));
    }
    // bcrypt truncates past 72 bytes; cap well below to keep inputs sane
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password",
            MAX_PASSWORD_LENGTH,
        )));
    }
    Ok(())
}

/// Hashes a password after checking the length policy.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies() {
        let hash = hash_password("Secret123").expect("hashing failed");
        assert_ne!(hash, "Secret123");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("Secret123", &hash).unwrap());
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hash = hash_password("Secret123").expect("hashing failed");
        assert!(!verify_password("Wrong456", &hash).unwrap());
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(hash_password("abc12").is_err());
    }

    #[test]
    fn rejects_oversized_passwords() {
        assert!(hash_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn six_characters_is_enough() {
        assert!(hash_password("abc123").is_ok());
    }
}
