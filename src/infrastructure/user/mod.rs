//! User infrastructure module
//!
//! This module provides implementations for user registration, including
//! password hashing with Argon2, in-memory and PostgreSQL repositories, and
//! the registrar that ties them together.

mod password;
mod postgres_repository;
mod registrar;
mod repository;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use registrar::Registrar;
pub use repository::InMemoryUserRepository;

#[cfg(test)]
pub(crate) use password::fast_hasher;
