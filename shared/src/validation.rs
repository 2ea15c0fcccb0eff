//! Input validation functions
//!
//! Field validators return every message that applies so callers can
//! aggregate them into [`crate::FieldErrors`].

use validator::ValidateEmail;

pub const BLANK_FIELD: &str = "This field may not be blank.";
pub const NULL_FIELD: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";

/// Key for errors that concern the body as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Validate a username: letters, digits and `@ . + - _`, at most 150 characters
pub fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push(BLANK_FIELD.to_string());
        return errors;
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        errors.push(format!(
            "Ensure this field has no more than {} characters.",
            USERNAME_MAX_LENGTH
        ));
    }
    if !username.chars().all(is_username_char) {
        errors.push(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    errors
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Validate email format and length
pub fn validate_email(email: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push(BLANK_FIELD.to_string());
        return errors;
    }
    if email.chars().count() > EMAIL_MAX_LENGTH {
        errors.push(format!(
            "Ensure this field has no more than {} characters.",
            EMAIL_MAX_LENGTH
        ));
    }
    if !email.validate_email() {
        errors.push("Enter a valid email address.".to_string());
    }
    errors
}

/// Normalize an email address for storage and lookup.
///
/// Surrounding whitespace is dropped and the domain part lowercased; the
/// local part is case-sensitive and kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
