//! Field and form validation rules
//!
//! Checks run independently and the first failure short-circuits with a
//! message naming the offending field; there is no aggregation of multiple
//! errors. All checks happen before any store mutation.

use crate::errors::{DomainError, DomainResult};

/// An email must contain both "@" and "."
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@') && email.contains('.')
}

/// A username must be non-empty and contain no digits
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && !username.chars().any(|c| c.is_ascii_digit())
}

/// A password must contain an uppercase letter, a digit, and a symbol
///
/// A symbol is any character that is neither a letter nor a digit. Length is
/// checked separately by the form-level validators.
pub fn is_valid_password(password: &str) -> bool {
    let mut has_upper = false;
    let mut has_digit = false;
    let mut has_symbol = false;

    for c in password.chars() {
        if c.is_uppercase() {
            has_upper = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if !c.is_alphabetic() {
            has_symbol = true;
        }
    }

    has_upper && has_digit && has_symbol
}

/// Validate login form inputs
pub fn validate_login(identifier: &str, password: &str) -> DomainResult<()> {
    if identifier.is_empty() || password.is_empty() {
        return Err(DomainError::validation(
            "email/username and password are required",
        ));
    }
    if !is_valid_email(identifier) && !is_valid_username(identifier) {
        return Err(DomainError::validation(
            "please enter a valid email or username",
        ));
    }
    Ok(())
}

/// Validate sign-up form inputs
pub fn validate_signup(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> DomainResult<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(DomainError::validation("all fields are required"));
    }
    validate_registration_fields(username, email, password)?;
    if password != confirm {
        return Err(DomainError::validation("passwords do not match"));
    }
    Ok(())
}

/// Validate the stored fields of a registration, without the confirm check
///
/// Used directly by the user store so a caller cannot bypass the field rules
/// by skipping the form-level validator.
pub fn validate_registration_fields(
    username: &str,
    email: &str,
    password: &str,
) -> DomainResult<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(DomainError::validation("all fields are required"));
    }
    if !is_valid_username(username) {
        return Err(DomainError::validation("username must not contain numbers"));
    }
    if !is_valid_email(email) {
        return Err(DomainError::validation("invalid email format"));
    }
    validate_password_rules(password)
}

/// Validate forgot-password form inputs
pub fn validate_forgot_password(email: &str, new_password: &str, confirm: &str) -> DomainResult<()> {
    if email.is_empty() || new_password.is_empty() || confirm.is_empty() {
        return Err(DomainError::validation("all fields are required"));
    }
    if !is_valid_email(email) {
        return Err(DomainError::validation("invalid email format"));
    }
    validate_password_rules(new_password)?;
    if new_password != confirm {
        return Err(DomainError::validation("passwords do not match"));
    }
    Ok(())
}

fn validate_password_rules(password: &str) -> DomainResult<()> {
    if password.chars().count() <= 6 {
        return Err(DomainError::validation(
            "password must be greater than 6 characters",
        ));
    }
    if !is_valid_password(password) {
        return Err(DomainError::validation(
            "password must contain at least one uppercase letter, one number, and one symbol",
        ));
    }
    Ok(())
}
