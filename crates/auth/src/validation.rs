//! Field-level validation shared by the auth and listing flows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_PASSWORD_LEN: usize = 6;

/// One rejected form field with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub(crate) fn validate_registration(
    nombre: &str,
    email: &str,
    password: &str,
    repetir_password: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if nombre.trim().is_empty() {
        errors.push(FieldError::new("nombre", "Nombre obligatorio"));
    }
    if !is_email(email) {
        errors.push(FieldError::new("email", "Email obligatorio"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "Password inferior a 6 caracteres"));
    }
    if password != repetir_password {
        errors.push(FieldError::new("repetir_password", "Passwords no coinciden"));
    }

    errors
}

pub(crate) fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !is_email(email) {
        errors.push(FieldError::new("email", "Email obligatorio"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password obligatorio"));
    }

    errors
}

pub(crate) fn validate_new_password(password: &str) -> Vec<FieldError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        vec![FieldError::new("password", "Password inferior a 6 caracteres")]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_collects_every_failing_field() {
        let errors = validate_registration("", "nope", "123", "456");
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["nombre", "email", "password", "repetir_password"]);
    }

    #[test]
    fn registration_accepts_valid_input() {
        assert!(validate_registration("Ana", "ana@correo.com", "secreto", "secreto").is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(is_email("jurgen@admin.com"));
        assert!(is_email("  jurgen@admin.com "));
        assert!(!is_email("jurgen@admin"));
        assert!(!is_email("jurgen admin@x.com"));
    }
}
