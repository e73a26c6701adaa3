//! Domain layer - Core business logic and entities

pub mod auth;
pub mod error;
pub mod session;
pub mod user;

pub use auth::{TokenKind, TokenPair, TokenPayload};
pub use error::DomainError;
pub use session::{RefreshSession, SessionRepository};
pub use user::{User, UserId, UserProfile, UserRepository};
