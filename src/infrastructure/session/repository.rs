//! In-memory refresh session repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::session::{RefreshSession, SessionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct SessionTable {
    sessions: HashMap<String, RefreshSession>,
    /// user ID -> tokens
    by_user: HashMap<UserId, HashSet<String>>,
}

impl SessionTable {
    fn put(&mut self, session: RefreshSession) {
        self.by_user
            .entry(*session.user_id())
            .or_default()
            .insert(session.token().to_string());
        self.sessions.insert(session.token().to_string(), session);
    }

    fn take(&mut self, token: &str) -> Option<RefreshSession> {
        let session = self.sessions.remove(token)?;

        if let Some(tokens) = self.by_user.get_mut(session.user_id()) {
            tokens.remove(token);

            if tokens.is_empty() {
                self.by_user.remove(session.user_id());
            }
        }

        Some(session)
    }
}

/// In-memory implementation of SessionRepository
///
/// Rotation runs inside a single write-lock critical section.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionRepository {
    table: Arc<RwLock<SessionTable>>,
}

impl InMemorySessionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.table.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, DomainError> {
        let mut table = self.table.write().await;

        if table.sessions.contains_key(session.token()) {
            return Err(DomainError::conflict("Refresh session already exists"));
        }

        table.put(session.clone());

        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, DomainError> {
        let table = self.table.read().await;
        Ok(table.sessions.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.take(token).is_some())
    }

    async fn replace(
        &self,
        old_token: &str,
        replacement: RefreshSession,
    ) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        if old_token != replacement.token() && table.sessions.contains_key(replacement.token()) {
            return Err(DomainError::conflict("Refresh session already exists"));
        }

        if table.take(old_token).is_none() {
            return Ok(false);
        }

        table.put(replacement);

        Ok(true)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<RefreshSession>, DomainError> {
        let table = self.table.read().await;

        let sessions = table
            .by_user
            .get(user_id)
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|t| table.sessions.get(t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(sessions)
    }

    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let mut table = self.table.write().await;

        let tokens = table.by_user.remove(user_id).unwrap_or_default();

        for token in &tokens {
            table.sessions.remove(token);
        }

        Ok(tokens.len() as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut table = self.table.write().await;

        let expired: Vec<String> = table
            .sessions
            .values()
            .filter(|s| s.is_expired_at(now))
            .map(|s| s.token().to_string())
            .collect();

        for token in &expired {
            table.take(token);
        }

        Ok(expired.len() as u64)
    }
}
