//! Refresh session infrastructure
//!
//! In-memory and PostgreSQL registries, the session service and the background
//! sweeper.

mod postgres_repository;
mod repository;
mod service;
mod sweeper;

pub use postgres_repository::PostgresSessionRepository;
pub use repository::InMemorySessionRepository;
pub use service::{SessionPurger, SessionService};
pub use sweeper::spawn_session_sweeper;
