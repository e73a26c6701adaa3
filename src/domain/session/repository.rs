//! Refresh session repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::RefreshSession;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for refresh session persistence
///
/// Lookups return rows regardless of expiry; callers decide how to treat a lapsed
/// row. `delete_expired` is the passive sweep.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync + Debug {
    /// Insert a new session, `Conflict` if the token string already exists
    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, DomainError>;

    /// Find a session by its token string
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, DomainError>;

    /// Delete a session by token, returning whether a row was removed
    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError>;

    /// Atomically delete `old_token` and insert `replacement`
    ///
    /// Returns `Ok(false)` and inserts nothing when `old_token` is not present, so
    /// only one of several concurrent rotations of the same token can succeed.
    async fn replace(
        &self,
        old_token: &str,
        replacement: RefreshSession,
    ) -> Result<bool, DomainError>;

    /// List every session owned by a user
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<RefreshSession>, DomainError>;

    /// Delete every session owned by a user
    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64, DomainError>;

    /// Delete sessions whose expiry is at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
