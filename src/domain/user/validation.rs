//! Signup payload validation
//!
//! Turns an untyped JSON payload into a [`SignupRequest`], or into a
//! [`FieldErrors`] map holding every problem found. Validation never stops at
//! the first failing field, and within the password field every missing
//! character class is reported.

use std::collections::BTreeMap;
use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::signup::SignupRequest;

pub const FIELD_FIRSTNAME: &str = "firstname";
pub const FIELD_LASTNAME: &str = "lastname";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_AGE: &str = "age";
pub const FIELD_PASSWORD: &str = "password";

/// Key used for errors that concern the payload as a whole
pub const SCHEMA_KEY: &str = "_schema";

const SIGNUP_FIELDS: [&str; 5] = [
    FIELD_FIRSTNAME,
    FIELD_LASTNAME,
    FIELD_EMAIL,
    FIELD_AGE,
    FIELD_PASSWORD,
];

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 120;
const MIN_AGE: u8 = 18;
const MAX_AGE: u8 = 120;
const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters accepted as the "special" password class
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

static EMAIL_USER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:[-!#$%&'*+/=?^`{}|~\w]+(?:\.[-!#$%&'*+/=?^`{}|~\w]+)*",
        r#"|"(?:[\x01-\x08\x0B\x0C\x0E-\x1F!#-\[\]-\x7F]|\\[\x01-\x09\x0B\x0C\x0E-\x7F])*")$"#,
    ))
    .unwrap()
});

static EMAIL_DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,6}|[a-z0-9-]+[a-z0-9])",
        r"|\[(?:25[0-5]|2[0-4]\d|[01]?\d?\d)(?:\.(?:25[0-5]|2[0-4]\d|[01]?\d?\d)){3}\])$",
    ))
    .unwrap()
});

/// Domains accepted without matching [`EMAIL_DOMAIN_PATTERN`]
const EMAIL_DOMAIN_WHITELIST: [&str; 1] = ["localhost"];

/// Character classes a password must contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    Digit,
    Uppercase,
    Lowercase,
    Special,
}

impl CharacterClass {
    const ALL: [CharacterClass; 4] = [
        CharacterClass::Digit,
        CharacterClass::Uppercase,
        CharacterClass::Lowercase,
        CharacterClass::Special,
    ];

    fn matches(&self, c: char) -> bool {
        match self {
            Self::Digit => c.is_ascii_digit(),
            Self::Uppercase => c.is_ascii_uppercase(),
            Self::Lowercase => c.is_ascii_lowercase(),
            Self::Special => PASSWORD_SPECIAL_CHARACTERS.contains(c),
        }
    }
}

impl std::fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digit => write!(f, "digit"),
            Self::Uppercase => write!(f, "uppercase letter"),
            Self::Lowercase => write!(f, "lowercase letter"),
            Self::Special => write!(f, "special character"),
        }
    }
}

/// Errors that can occur during user validation
///
/// The display strings are the messages clients see in the error map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("Invalid input type.")]
    InvalidInputType,

    #[error("Unknown field.")]
    UnknownField,

    #[error("Missing data for required field.")]
    Missing,

    #[error("Field may not be null.")]
    Null,

    #[error("Not a valid string.")]
    NotAString,

    #[error("Not a valid integer.")]
    NotAnInteger,

    #[error("Length must be between {0} and {1}.")]
    LengthOutOfRange(usize, usize),

    #[error("Longer than maximum length {0}.")]
    TooLong(usize),

    #[error("Shorter than minimum length {0}.")]
    TooShort(usize),

    #[error("Not a valid email address.")]
    InvalidEmail,

    #[error("Must be greater than or equal to {0} and less than or equal to {1}.")]
    AgeOutOfRange(u8, u8),

    #[error("Password must contain at least one {0}")]
    PasswordMissing(CharacterClass),
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Append a validation error for a field
    pub fn push(&mut self, field: &str, error: UserValidationError) {
        self.add(field, error.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }

        Ok(())
    }
}

/// Validate a first or last name
///
/// Rules:
/// - Between 2 and 50 characters (counted as Unicode scalar values)
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    let length = name.chars().count();

    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(UserValidationError::LengthOutOfRange(
            MIN_NAME_LENGTH,
            MAX_NAME_LENGTH,
        ));
    }

    Ok(())
}

/// Validate an email address
///
/// Rules:
/// - Maximum 120 characters
/// - Local part is a dot-atom (Unicode word characters allowed) or a quoted string
/// - Domain is `localhost`, an IPv4 literal such as `[127.0.0.1]`, or a dotted
///   name whose last label is alphanumeric; internationalized names are
///   checked in their punycode form
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::TooLong(MAX_EMAIL_LENGTH));
    }

    let (user_part, domain_part) = email
        .rsplit_once('@')
        .ok_or(UserValidationError::InvalidEmail)?;

    if !EMAIL_USER_PATTERN.is_match(user_part) {
        return Err(UserValidationError::InvalidEmail);
    }

    if EMAIL_DOMAIN_WHITELIST.contains(&domain_part) || EMAIL_DOMAIN_PATTERN.is_match(domain_part)
    {
        return Ok(());
    }

    match ascii_domain(domain_part) {
        Some(ascii) if EMAIL_DOMAIN_PATTERN.is_match(&ascii) => Ok(()),
        _ => Err(UserValidationError::InvalidEmail),
    }
}

/// Punycode form of a non-ASCII domain name
fn ascii_domain(domain: &str) -> Option<String> {
    if domain.is_ascii() {
        return None;
    }

    match url::Host::parse(domain) {
        Ok(url::Host::Domain(ascii)) => Some(ascii),
        _ => None,
    }
}

/// Validate an age, returning it narrowed to `u8`
pub fn validate_age(age: i64) -> Result<u8, UserValidationError> {
    u8::try_from(age)
        .ok()
        .filter(|a| (MIN_AGE..=MAX_AGE).contains(a))
        .ok_or(UserValidationError::AgeOutOfRange(MIN_AGE, MAX_AGE))
}

/// Validate password strength
///
/// Rules:
/// - Minimum 8 characters
/// - At least one ASCII digit, uppercase letter, lowercase letter and
///   one character from [`PASSWORD_SPECIAL_CHARACTERS`]
///
/// Every failed rule is returned, in the order listed above.
pub fn validate_password(password: &str) -> Result<(), Vec<UserValidationError>> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(UserValidationError::TooShort(MIN_PASSWORD_LENGTH));
    }

    for class in CharacterClass::ALL {
        if !password.chars().any(|c| class.matches(c)) {
            errors.push(UserValidationError::PasswordMissing(class));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a raw signup payload
pub fn validate_signup(input: &Value) -> Result<SignupRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(object) = input.as_object() else {
        errors.push(SCHEMA_KEY, UserValidationError::InvalidInputType);
        return Err(errors);
    };

    for key in object.keys() {
        if !SIGNUP_FIELDS.contains(&key.as_str()) {
            errors.push(key, UserValidationError::UnknownField);
        }
    }

    let firstname = string_field(object, FIELD_FIRSTNAME, &mut errors, validate_name);
    let lastname = string_field(object, FIELD_LASTNAME, &mut errors, validate_name);
    let email = string_field(object, FIELD_EMAIL, &mut errors, validate_email);
    let age = age_field(object, &mut errors);
    let password = password_field(object, &mut errors);

    match (firstname, lastname, email, age, password) {
        (Some(firstname), Some(lastname), Some(email), Some(age), Some(password))
            if errors.is_empty() =>
        {
            Ok(SignupRequest {
                firstname,
                lastname,
                email,
                age,
                password,
            })
        }
        _ => Err(errors),
    }
}

/// Fetch a field that must be present and non-null
fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match object.get(field) {
        None => {
            errors.push(field, UserValidationError::Missing);
            None
        }
        Some(Value::Null) => {
            errors.push(field, UserValidationError::Null);
            None
        }
        Some(value) => Some(value),
    }
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    let value = required(object, field, errors)?;

    match value.as_str() {
        Some(s) => Some(s),
        None => {
            errors.push(field, UserValidationError::NotAString);
            None
        }
    }
}

fn string_field(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
    validate: fn(&str) -> Result<(), UserValidationError>,
) -> Option<String> {
    let value = required_str(object, field, errors)?;

    match validate(value) {
        Ok(()) => Some(value.to_string()),
        Err(e) => {
            errors.push(field, e);
            None
        }
    }
}

fn age_field(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<u8> {
    let value = required(object, FIELD_AGE, errors)?;

    let result = parse_integer(value).and_then(validate_age);

    match result {
        Ok(age) => Some(age),
        Err(e) => {
            errors.push(FIELD_AGE, e);
            None
        }
    }
}

fn password_field(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<String> {
    let value = required_str(object, FIELD_PASSWORD, errors)?;

    match validate_password(value) {
        Ok(()) => Some(value.to_string()),
        Err(failures) => {
            for failure in failures {
                errors.push(FIELD_PASSWORD, failure);
            }
            None
        }
    }
}

/// Interpret a JSON value as an integer
///
/// Accepts integers, floats without a fractional part, and strings holding a
/// base-10 integer. Booleans are rejected. Integers too large for `i64`
/// saturate so they report as out of range rather than as non-integers.
fn parse_integer(value: &Value) -> Result<i64, UserValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }

            // Integral but above i64::MAX: still an integer, just out of range
            if n.is_u64() {
                return Ok(i64::MAX);
            }

            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => {
                    if f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                        Ok(f as i64)
                    } else {
                        Ok(i64::MAX)
                    }
                }
                _ => Err(UserValidationError::NotAnInteger),
            }
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(i),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(UserValidationError::NotAnInteger),
            },
        },
        _ => Err(UserValidationError::NotAnInteger),
    }
}
