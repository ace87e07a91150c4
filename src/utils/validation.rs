use regex::Regex;

use crate::utils::error::CustomError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn validate_password(password: &str) -> Result<(), CustomError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CustomError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CustomError> {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| CustomError::InternalServerError(format!("email pattern: {}", e)))?;

    if !re.is_match(email) {
        return Err(CustomError::ValidationError(
            "please provide a valid email".into(),
        ));
    }

    Ok(())
}

/// Rejects missing or whitespace-only values.
pub fn require<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, CustomError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CustomError::ValidationError(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_needs_six_characters() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("secret1").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("jane@x.com").is_ok());
        assert!(validate_email("jane.x.com").is_err());
        assert!(validate_email("jane@x").is_err());
    }

    #[test]
    fn require_trims() {
        assert!(require(Some("   "), "missing").is_err());
        assert!(require(None, "missing").is_err());
        assert_eq!(require(Some(" a "), "missing").unwrap(), "a");
    }
}
