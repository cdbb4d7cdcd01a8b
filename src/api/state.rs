//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{SignupRequest, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::{PasswordHasher, Registrar};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub signup_service: Arc<dyn SignupServiceTrait>,
}

impl AppState {
    pub fn new(signup_service: Arc<dyn SignupServiceTrait>) -> Self {
        Self { signup_service }
    }
}

/// Trait for signup service operations
#[async_trait::async_trait]
pub trait SignupServiceTrait: Send + Sync {
    async fn register(&self, request: SignupRequest) -> Result<UserId, DomainError>;
    async fn user_count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> SignupServiceTrait for Registrar<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: SignupRequest) -> Result<UserId, DomainError> {
        Registrar::register(self, request).await
    }

    async fn user_count(&self) -> Result<usize, DomainError> {
        Registrar::user_count(self).await
    }
}
