/// Sign-up input validators
/// 1. Length limits on usernames and passwords (DoS protection)
/// 2. A restricted username alphabet
/// 3. Rejection of NUL bytes in passwords

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_BYTES: usize = 72; // bcrypt ignores anything past 72 bytes

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._@-]+$").unwrap();
}

/// Canonical form of a username, shared by sign-up and sign-in.
pub fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Validates a username for sign-up and returns it normalized.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = normalize_username(username);

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    let length = trimmed.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username".to_string(), MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a sign-up password. Passwords are never trimmed.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }

    if password.contains('\0') {
        return Err(ValidationError::InvalidFormat("password".to_string()));
    }

    Ok(())
}
