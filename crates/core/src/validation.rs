//! Field-level validation shared by every write endpoint.
//!
//! Request DTOs derive [`validator::Validate`] for declarative rules (length,
//! email) and point their `custom` rules at the functions in this module.
//! Failures from either source are collected into [`FieldErrors`], a flat,
//! serializable list of `{ field, message }` pairs returned to clients.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid regex"));

static GUEST_TYPE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zА-Яа-яЁё0-9.,\-\s]+$").expect("valid regex"));

/// Maximum length of a guest comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 256;

// ---------------------------------------------------------------------------
// Field error list
// ---------------------------------------------------------------------------

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered list of rejected fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any error was recorded against `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            for err in errs.iter() {
                out.push(&field, describe(err));
            }
        }
        // HashMap iteration order is unstable; keep responses deterministic.
        out.0.sort_by(|a, b| a.field.cmp(&b.field));
        out
    }
}

/// Run the derived rules of a request DTO.
pub fn validate_request<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::FieldFormat(errors.into()))
}

/// Human-readable message for a `validator` failure.
fn describe(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    match err.code.as_ref() {
        "length" => {
            let min = err.params.get("min").and_then(|v| v.as_u64());
            let max = err.params.get("max").and_then(|v| v.as_u64());
            match (min, max) {
                (Some(min), Some(max)) => {
                    format!("Length must be between {min} and {max} characters")
                }
                (None, Some(max)) => format!("Length must be at most {max} characters"),
                (Some(min), None) => format!("Length must be at least {min} characters"),
                (None, None) => "Invalid length".to_string(),
            }
        }
        "email" => "Not a valid email address".to_string(),
        other => format!("Invalid value ({other})"),
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// ---------------------------------------------------------------------------
// Custom rules referenced from `#[validate(custom(function = "..."))]`
// ---------------------------------------------------------------------------

/// Usernames contain only ASCII letters, digits, and underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(rule(
            "username_chars",
            "Username should contain only alphanumeric symbols and underscores",
        ))
    }
}

/// Passwords need a lowercase letter, an uppercase letter, a digit, and one
/// other symbol. Length is checked separately by the DTO's `length` rule.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule(
            "password_lowercase",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule(
            "password_uppercase",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule(
            "password_digit",
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(rule(
            "password_symbol",
            "Password must contain at least one symbol that is neither a letter nor a digit",
        ));
    }
    Ok(())
}

/// Guest type names allow letters, digits, `.`, `,`, `-`, and whitespace.
pub fn validate_guest_type_name(name: &str) -> Result<(), ValidationError> {
    if GUEST_TYPE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(rule(
            "guest_type_name_chars",
            "Name should contain only letters, numbers and punctuation marks",
        ))
    }
}

/// Guest comments are at most [`MAX_COMMENT_LENGTH`] characters.
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.chars().count() <= MAX_COMMENT_LENGTH {
        Ok(())
    } else {
        Err(rule(
            "comment_length",
            "Comment must be at most 256 characters",
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 3, max = 50), custom(function = "validate_username"))]
        username: String,
        #[validate(email)]
        email: String,
        #[validate(
            length(min = 8, max = 256),
            custom(function = "validate_password")
        )]
        password: String,
    }

    fn signup(username: &str, email: &str, password: &str) -> Signup {
        Signup {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn username_accepts_word_characters() {
        assert!(validate_username("guest_admin_01").is_ok());
    }

    #[test]
    fn username_rejects_spaces_and_punctuation() {
        assert!(validate_username("guest admin").is_err());
        assert!(validate_username("guest-admin").is_err());
        assert!(validate_username("gäst").is_err());
    }

    #[test]
    fn password_requires_each_character_class() {
        assert_eq!(
            validate_password("upper1!x").unwrap_err().code,
            "password_uppercase"
        );
        assert_eq!(
            validate_password("LOWER1!X").unwrap_err().code,
            "password_lowercase"
        );
        assert_eq!(
            validate_password("NoDigits!").unwrap_err().code,
            "password_digit"
        );
        assert_eq!(
            validate_password("NoSymbol1").unwrap_err().code,
            "password_symbol"
        );
        assert!(validate_password("Str0ng!pass").is_ok());
    }

    #[test]
    fn guest_type_name_allows_cyrillic_and_punctuation() {
        assert!(validate_guest_type_name("Гость, VIP-1.").is_ok());
        assert!(validate_guest_type_name("Contractor").is_ok());
        assert!(validate_guest_type_name("Contractor!").is_err());
        assert!(validate_guest_type_name("<script>").is_err());
    }

    #[test]
    fn comment_length_counts_characters_not_bytes() {
        assert!(validate_comment(&"я".repeat(MAX_COMMENT_LENGTH)).is_ok());
        assert_eq!(
            validate_comment(&"x".repeat(MAX_COMMENT_LENGTH + 1))
                .unwrap_err()
                .code,
            "comment_length"
        );
    }

    #[test]
    fn derived_rules_collect_every_failed_field() {
        let input = signup("ab", "not-an-email", "weak");
        let err = validate_request(&input).unwrap_err();
        assert_matches!(err, CoreError::FieldFormat(fields) => {
            assert!(fields.contains("username"));
            assert!(fields.contains("email"));
            assert!(fields.contains("password"));
        });
    }

    #[test]
    fn field_errors_are_sorted_by_field_name() {
        let input = signup("bad name", "nope", "Str0ng!pass");
        let fields: FieldErrors = input.validate().unwrap_err().into();
        let rendered = fields.to_string();
        assert!(rendered.starts_with("email: "), "{rendered}");
        assert!(rendered.contains("; username: "), "{rendered}");
    }

    #[test]
    fn length_failure_message_names_the_bounds() {
        let input = signup("ab", "user@example.com", "Str0ng!pass");
        let fields: FieldErrors = input.validate().unwrap_err().into();
        assert_eq!(
            fields.to_string(),
            "username: Length must be between 3 and 50 characters"
        );
    }

    #[test]
    fn valid_input_passes() {
        let input = signup("valid_user", "user@example.com", "Str0ng!pass");
        assert!(validate_request(&input).is_ok());
    }

    #[test]
    fn display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.push("coming_date", "Date cannot be in the past");
        errors.push("comment", "too long");
        assert_eq!(
            errors.to_string(),
            "coming_date: Date cannot be in the past; comment: too long"
        );
    }
}
