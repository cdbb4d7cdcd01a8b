//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Name of the primary key constraint on `users`; every other unique
/// violation on the table is the email constraint.
const PRIMARY_KEY_CONSTRAINT: &str = "users_pkey";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, firstname, lastname, email, age, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, firstname, lastname, email, age, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, firstname, lastname, email, age, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.firstname())
        .bind(user.lastname())
        .bind(user.email())
        .bind(i32::from(user.age()))
        .bind(user.password_hash())
        .bind(user.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &user))?;

        // Dropping `tx` on any earlier return rolls the insert back
        tx.commit()
            .await
            .map_err(|e| map_insert_error(e, &user))?;

        Ok(user)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn map_insert_error(error: sqlx::Error, user: &User) -> DomainError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            if db_error.constraint() == Some(PRIMARY_KEY_CONSTRAINT) {
                return DomainError::storage(format!(
                    "User with ID '{}' already exists",
                    user.id()
                ));
            }

            return DomainError::duplicate_email(user.email());
        }
    }

    DomainError::storage(format!("Failed to create user: {}", error))
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: Uuid = row.get("id");
    let firstname: String = row.get("firstname");
    let lastname: String = row.get("lastname");
    let email: String = row.get("email");
    let age: i32 = row.get("age");
    let password_hash: String = row.get("password_hash");
    let created_at: DateTime<Utc> = row.get("created_at");

    let user = User::new(
        UserId::from_uuid(id),
        firstname,
        lastname,
        email,
        age_from_column(age)?,
        password_hash,
    );

    Ok(user.with_created_at(created_at))
}

fn age_from_column(age: i32) -> Result<u8, DomainError> {
    u8::try_from(age)
        .map_err(|_| DomainError::storage(format!("Invalid age in database: {}", age)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_from_column() {
        assert_eq!(age_from_column(30).unwrap(), 30);
        assert!(matches!(
            age_from_column(-1),
            Err(DomainError::Storage { .. })
        ));
        assert!(age_from_column(300).is_err());
    }

    #[test]
    fn test_non_database_error_maps_to_storage() {
        let user = User::new(UserId::generate(), "Ann", "Lee", "ann@example.com", 30, "h");
        let error = map_insert_error(sqlx::Error::PoolTimedOut, &user);

        assert!(matches!(error, DomainError::Storage { .. }));
    }

    /// Runs against a real database when `TEST_DATABASE_URL` is set:
    /// `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_unique_constraint_under_concurrency() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
        let pool = PgPool::connect(&url).await.unwrap();
        crate::infrastructure::storage::run_storage_migrations(&pool)
            .await
            .unwrap();

        let repo = PostgresUserRepository::new(pool);
        let email = format!("race-{}@example.com", Uuid::new_v4());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let email = email.clone();
                tokio::spawn(async move {
                    repo.insert(User::new(UserId::generate(), "Ann", "Lee", email, 30, "h"))
                        .await
                })
            })
            .collect();

        let mut created = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::DuplicateEmail { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);

        let stored = repo.get_by_email(&email).await.unwrap().unwrap();
        assert_eq!(stored.email(), email);
    }
}
