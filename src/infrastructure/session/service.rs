//! Session registry service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::domain::session::{RefreshSession, SessionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Registry of outstanding refresh tokens
#[derive(Debug)]
pub struct SessionService<S: SessionRepository> {
    repository: Arc<S>,
}

impl<S: SessionRepository> SessionService<S> {
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    /// Record a refresh token for a user, valid for `ttl`
    pub async fn record(
        &self,
        token: &str,
        user_id: &UserId,
        ttl: Duration,
    ) -> Result<RefreshSession, DomainError> {
        self.repository
            .insert(RefreshSession::new(token, *user_id, ttl))
            .await
    }

    /// Find a live session; expired rows count as absent
    pub async fn find_by_token(&self, token: &str) -> Result<RefreshSession, DomainError> {
        match self.repository.find_by_token(token).await? {
            Some(session) if !session.is_expired() => Ok(session),
            _ => Err(DomainError::not_found("Refresh session not found")),
        }
    }

    /// Find a session whether or not it has lapsed
    ///
    /// Only the refresh flow uses this, so it can tell an expired row from a
    /// missing one.
    pub async fn lookup(&self, token: &str) -> Result<Option<RefreshSession>, DomainError> {
        self.repository.find_by_token(token).await
    }

    /// Delete a session if present. Revoking an unknown token is not an error.
    pub async fn revoke(&self, token: &str) -> Result<bool, DomainError> {
        let removed = self.repository.delete_by_token(token).await?;

        if !removed {
            debug!("Revoke requested for unknown refresh session");
        }

        Ok(removed)
    }

    /// Replace `old_token` with `new_token` in one atomic store operation
    ///
    /// Fails with `TokenInvalid` when the old row is already gone, which is how a
    /// lost concurrent rotation surfaces.
    pub async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        user_id: &UserId,
        ttl: Duration,
    ) -> Result<RefreshSession, DomainError> {
        let replacement = RefreshSession::new(new_token, *user_id, ttl);

        if self.repository.replace(old_token, replacement.clone()).await? {
            Ok(replacement)
        } else {
            Err(DomainError::TokenInvalid)
        }
    }

    /// Remove every session of a user
    pub async fn revoke_all_for_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        self.repository.delete_by_user(user_id).await
    }
}

/// Something that can delete expired sessions
#[async_trait]
pub trait SessionPurger: Send + Sync + std::fmt::Debug {
    /// Delete every lapsed session, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, DomainError>;
}

#[async_trait]
impl<S: SessionRepository> SessionPurger for SessionService<S> {
    async fn purge_expired(&self) -> Result<u64, DomainError> {
        self.repository.delete_expired(Utc::now()).await
    }
}
