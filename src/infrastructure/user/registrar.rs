//! User registration: uniqueness check, hashing and persistence

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{SignupRequest, User, UserId, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Registers validated signups
///
/// Holds only shared handles; no state survives between calls.
#[derive(Debug)]
pub struct Registrar<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher + 'static> Registrar<R, H> {
    /// Create a new registrar
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user, returning the assigned identifier
    ///
    /// The email pre-check only avoids hashing for obvious duplicates; the
    /// repository's insert is what guarantees uniqueness.
    pub async fn register(&self, request: SignupRequest) -> Result<UserId, DomainError> {
        if self.repository.email_exists(&request.email).await? {
            debug!("Signup rejected: email already registered");
            return Err(DomainError::duplicate_email(request.email));
        }

        let SignupRequest {
            firstname,
            lastname,
            email,
            age,
            password,
        } = request;

        let password_hash = self.hash_password(password).await?;

        let user = User::new(
            UserId::generate(),
            firstname,
            lastname,
            email,
            age,
            password_hash,
        );

        match self.repository.insert(user).await {
            Ok(user) => {
                info!(user_id = %user.id(), "User registered");
                Ok(*user.id())
            }
            Err(e @ DomainError::DuplicateEmail { .. }) => {
                debug!("Signup lost uniqueness race at insert");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist user");
                Err(e)
            }
        }
    }

    /// Get a user by exact email match
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_email(email).await
    }

    /// Count registered users
    pub async fn user_count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Argon2 is deliberately slow, so it runs on the blocking pool
    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }
}
