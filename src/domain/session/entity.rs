//! Refresh session entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// One outstanding refresh-capable login
///
/// The presence of a record is the proof that its refresh token has not been
/// revoked. The record's own expiry is independent of the expiry signed into the
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSession {
    token: String,
    user_id: UserId,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Create a session for `token` that lives for `ttl` from now
    pub fn new(token: impl Into<String>, user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            token: token.into(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a session from persisted columns
    pub fn restore(
        token: String,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            user_id,
            expires_at,
            created_at,
            updated_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the session had lapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
