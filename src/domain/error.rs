use thiserror::Error;

use crate::domain::user::FieldErrors;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {errors}")]
    Validation { errors: FieldErrors },

    #[error("Email already registered")]
    DuplicateEmail { email: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_error() {
        let error = DomainError::duplicate_email("ann@example.com");

        // Rendered errors end up in logs, so the address stays out
        assert_eq!(error.to_string(), "Email already registered");
        assert!(matches!(error, DomainError::DuplicateEmail { ref email } if email == "ann@example.com"));
    }

    #[test]
    fn test_storage_error() {
        let error = DomainError::storage("connection refused");
        assert_eq!(error.to_string(), "Storage error: connection refused");
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.add("age", "Not a valid integer.");

        let error = DomainError::validation(errors);
        assert!(error.to_string().contains("age: Not a valid integer."));
    }
}
