//! User infrastructure module
//!
//! Argon2 password hashing, in-memory and PostgreSQL repositories, and the user
//! service that acts as the credential store.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHashConfig, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdateProfileRequest, UserService};
