//! Refresh session domain

mod entity;
mod repository;

pub use entity::RefreshSession;
pub use repository::SessionRepository;

#[cfg(test)]
pub use repository::MockSessionRepository;
