//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// System-assigned user identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one read back from storage
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered user
///
/// Only ever constructed with an already-hashed password. The hash is
/// skipped during serialization so a `User` can be logged or returned
/// without leaking it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: UserId,
    firstname: String,
    lastname: String,
    email: String,
    age: u8,
    #[serde(skip_serializing)]
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(
        id: UserId,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        age: u8,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            age,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp when rehydrating from storage
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::new(
            UserId::generate(),
            "Ann",
            "Lee",
            "ann@example.com",
            30,
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
        )
    }

    #[test]
    fn test_user_id_generate_is_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_user_id_wraps_uuid() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);

        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.firstname(), "Ann");
        assert_eq!(user.lastname(), "Lee");
        assert_eq!(user.email(), "ann@example.com");
        assert_eq!(user.age(), 30);
        assert!(user.password_hash().starts_with("$argon2id$"));
    }

    #[test]
    fn test_with_created_at() {
        let ts = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let user = create_test_user().with_created_at(ts);
        assert_eq!(user.created_at(), ts);
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("ann@example.com"));
    }
}
