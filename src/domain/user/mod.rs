//! User domain
//!
//! This module provides domain types and traits for user registration,
//! including the user entity, signup validation, and the repository trait.

mod entity;
mod repository;
mod signup;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use signup::SignupRequest;
pub use validation::{
    validate_age, validate_email, validate_name, validate_password, validate_signup,
    CharacterClass, FieldErrors, UserValidationError, FIELD_AGE, FIELD_EMAIL, FIELD_FIRSTNAME,
    FIELD_LASTNAME, FIELD_PASSWORD, PASSWORD_SPECIAL_CHARACTERS, SCHEMA_KEY,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
