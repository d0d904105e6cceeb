use regex::Regex;
use std::sync::OnceLock;

use super::entity::{AuthMode, Credentials};
use crate::domain::ValidationError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// Checks entered credentials before anything is sent to the backend.
///
/// Rules, in the order they are reported:
/// 1. Email is required
/// 2. Email must look like `local@domain.tld`
/// 3. Password is required
/// 4. When signing up, the password has a minimum length
pub fn validate_credentials(
    credentials: &Credentials,
    mode: AuthMode,
) -> Result<(), ValidationError> {
    if credentials.email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !email_pattern().is_match(&credentials.email) {
        return Err(ValidationError::EmailInvalid);
    }
    if credentials.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if mode == AuthMode::SignUp && credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_required() {
        let result = validate_credentials(&Credentials::new("", "secret"), AuthMode::SignIn);
        assert_eq!(result, Err(ValidationError::EmailRequired));
    }

    #[test]
    fn test_email_format() {
        for email in ["ada", "ada@", "ada@example", "a da@example.com", "@example.com"] {
            let result = validate_credentials(&Credentials::new(email, "secret"), AuthMode::SignIn);
            assert_eq!(result, Err(ValidationError::EmailInvalid), "{}", email);
        }
    }

    #[test]
    fn test_password_required() {
        let result =
            validate_credentials(&Credentials::new("ada@example.com", ""), AuthMode::SignIn);
        assert_eq!(result, Err(ValidationError::PasswordRequired));
    }

    #[test]
    fn test_short_password_only_rejected_on_sign_up() {
        let credentials = Credentials::new("ada@example.com", "abc");
        assert!(validate_credentials(&credentials, AuthMode::SignIn).is_ok());
        assert_eq!(
            validate_credentials(&credentials, AuthMode::SignUp),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        let long_enough = Credentials::new("ada@example.com", "abcdef");
        assert!(validate_credentials(&long_enough, AuthMode::SignUp).is_ok());
    }
}
