//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations must enforce email uniqueness inside `insert` itself:
/// a caller's earlier `get_by_email` check can always lose a race.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by exact email match
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Atomically insert a new user
    ///
    /// Fails with `DomainError::DuplicateEmail` when the email is taken and
    /// with `DomainError::Storage` for any other write failure.
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    /// Count stored users
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if an email is already registered
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
