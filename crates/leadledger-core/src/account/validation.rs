//! Signup validation.

use super::model::NewAccount;

/// Validation error for a signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Full name is empty or too short.
    EmptyName,
    /// Email address is empty.
    EmptyEmail,
    /// Email address format is invalid.
    InvalidEmail,
    /// Password is shorter than 8 characters.
    ShortPassword,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "Full name is required",
            Self::EmptyEmail => "Email address is required",
            Self::InvalidEmail => "Invalid email address format",
            Self::ShortPassword => "Password must be at least 8 characters",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "full_name",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::ShortPassword => "password",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a signup request.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a signup request.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_signup(new: &NewAccount) -> ValidationResult {
    let mut errors = Vec::new();

    if new.full_name.trim().len() < 2 {
        errors.push(ValidationError::EmptyName);
    }

    if new.email.trim().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    } else if !is_valid_email(&new.email) {
        errors.push(ValidationError::InvalidEmail);
    }

    if new.password.len() < 8 {
        errors.push(ValidationError::ShortPassword);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Minimal email shape check: one `@` with a dotted domain after it.
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewAccount {
        NewAccount {
            full_name: "Jordan Kim".into(),
            email: "jordan@example.com".into(),
            password: "password123".into(),
            company_name: None,
            industry: None,
            role: None,
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(validate_signup(&request()).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let new = NewAccount {
            full_name: " ".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            company_name: None,
            industry: None,
            role: None,
        };
        let errors = validate_signup(&new).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::EmptyName));
        assert!(errors.contains(&ValidationError::InvalidEmail));
        assert!(errors.contains(&ValidationError::ShortPassword));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b@c.co"));
        assert!(!is_valid_email("plain"));
    }
}
