//! Signup Service
//!
//! HTTP service that registers users:
//! - Field-level validation of signup payloads
//! - Argon2id password hashing
//! - Email uniqueness enforced by the user store (in-memory or PostgreSQL)

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, SignupServiceTrait};
use config::StorageBackend;
use infrastructure::storage::{connect_pool, run_storage_migrations, PostgresConfig};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, Registrar,
};
use tracing::info;

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher = Arc::new(Argon2Hasher::with_config(&config.password)?);

    info!("Storage backend: {:?}", config.storage.backend);

    let signup_service: Arc<dyn SignupServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage for users");
            Arc::new(Registrar::new(
                Arc::new(InMemoryUserRepository::new()),
                hasher,
            ))
        }
        StorageBackend::Postgres => {
            let pg_config = PostgresConfig::from_storage_config(&config.storage)?;
            let pool = connect_pool(&pg_config).await?;

            if config.storage.run_migrations {
                info!("Running database migrations...");
                run_storage_migrations(&pool).await?;
                info!("Database migrations completed");
            }

            Arc::new(Registrar::new(
                Arc::new(PostgresUserRepository::new(pool)),
                hasher,
            ))
        }
    };

    Ok(AppState::new(signup_service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordConfig;
    use crate::domain::SignupRequest;

    fn fast_config() -> AppConfig {
        AppConfig {
            password: PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_memory_backend_state() {
        let state = create_app_state_with_config(&fast_config()).await.unwrap();

        let request = SignupRequest {
            firstname: "Ann".to_string(),
            lastname: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            age: 30,
            password: "Passw0rd!".to_string(),
        };
        state.signup_service.register(request).await.unwrap();

        assert_eq!(state.signup_service.user_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_url() {
        let mut config = fast_config();
        config.storage.backend = StorageBackend::Postgres;
        config.storage.database_url = None;

        let err = create_app_state_with_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("database_url"));
    }

    #[tokio::test]
    async fn test_invalid_password_params_rejected() {
        let mut config = fast_config();
        config.password.iterations = 0;

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
