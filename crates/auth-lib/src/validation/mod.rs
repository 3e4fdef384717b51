// ============================
// crates/auth-lib/src/validation/mod.rs
// ============================
//! Credential validation and normalization.
//!
//! Raw email/password input is validated here before it touches storage or
//! the hash primitive. Email matching is case-preserving: callers wanting
//! case-insensitive lookups must normalize separately.

use crate::error::AuthError;
use regex::Regex;
use std::sync::LazyLock;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Validate an email address.
///
/// Returns the trimmed address. The value is not lower-cased.
pub fn validate_email(email: &str) -> Result<String, AuthError> {
    if email.is_empty() {
        return Err(AuthError::InvalidEmail(
            "email address cannot be empty".to_string(),
        ));
    }

    let email = email.trim();

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::InvalidEmail(format!(
            "email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(AuthError::InvalidEmail(
            "invalid email address format".to_string(),
        ));
    }

    Ok(email.to_string())
}

/// Validate a password.
///
/// Returns the trimmed password. Strength policy is the embedding
/// application's concern; this core only rejects effectively-empty input.
pub fn validate_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidPassword(
            "password cannot be empty".to_string(),
        ));
    }

    let password = password.trim();

    if password.is_empty() {
        return Err(AuthError::InvalidPassword(
            "password cannot consist of whitespace only".to_string(),
        ));
    }

    Ok(password.to_string())
}

/// Normalize an optional username.
///
/// A trimmed-empty or whitespace-only value means "no username" and comes
/// back as `None`, distinct from a meaningful name.
pub fn normalize_username(username: Option<&str>) -> Option<String> {
    let trimmed = username?.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
