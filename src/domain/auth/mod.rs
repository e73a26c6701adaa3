//! Authentication domain types
//!
//! The identity carried inside bearer tokens and the token pair handed to clients.

use serde::{Deserialize, Serialize};

use crate::domain::user::{User, UserId};

/// Identity claims embedded in both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub user_id: UserId,
    pub username: String,
}

impl TokenPayload {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Build the payload for a user
    pub fn for_user(user: &User) -> Self {
        Self::new(*user.id(), user.username())
    }
}

/// Kind of bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serializes_camel_case() {
        let id = UserId::new();
        let payload = TokenPayload::new(id, "alice");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], id.to_string());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!(TokenKind::Refresh.to_string(), "refresh");
    }

    #[test]
    fn test_payload_for_user() {
        let user = User::new("a@x.com", "alice", "Alice", "hash");
        let payload = TokenPayload::for_user(&user);

        assert_eq!(payload.user_id, *user.id());
        assert_eq!(payload.username, "alice");
    }
}
