//! Auth flow controller: signup, signin, refresh, logout and bearer verification

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::auth::{TokenPair, TokenPayload};
use crate::domain::session::SessionRepository;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::session::SessionService;
use crate::infrastructure::user::{CreateUserRequest, PasswordHasher, UserService};

use super::jwt::TokenCodec;

/// Successful signin: the sanitized user and a fresh token pair
#[derive(Debug, Clone, Serialize)]
pub struct SigninResult {
    pub user: User,
    pub tokens: TokenPair,
}

/// Orchestrates the credential store, token codec and session registry
#[derive(Debug)]
pub struct AuthService<R, H, S>
where
    R: UserRepository,
    H: PasswordHasher,
    S: SessionRepository,
{
    users: Arc<UserService<R, H>>,
    sessions: Arc<SessionService<S>>,
    codec: Arc<dyn TokenCodec>,
}

impl<R, H, S> AuthService<R, H, S>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
    S: SessionRepository,
{
    pub fn new(
        users: Arc<UserService<R, H>>,
        sessions: Arc<SessionService<S>>,
        codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
        }
    }

    /// Register a new account. Issues no tokens.
    pub async fn signup(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let result = self.users.create(request).await;
        record_auth_event("signup", &result);

        let user = result?;
        info!(user_id = %user.id(), "User signed up");

        Ok(user)
    }

    /// Exchange credentials for a token pair and record the refresh session
    pub async fn signin(&self, email: &str, password: &str) -> Result<SigninResult, DomainError> {
        let result = self.signin_inner(email, password).await;
        record_auth_event("signin", &result);

        let signed_in = result?;
        info!(user_id = %signed_in.user.id(), "User signed in");

        Ok(signed_in)
    }

    async fn signin_inner(&self, email: &str, password: &str) -> Result<SigninResult, DomainError> {
        let user = self.users.verify(email, password).await?;
        let payload = TokenPayload::for_user(&user);
        let tokens = self.issue_pair(&payload)?;

        self.sessions
            .record(&tokens.refresh_token, user.id(), self.codec.refresh_ttl())
            .await?;

        Ok(SigninResult {
            user: user.sanitized(),
            tokens,
        })
    }

    /// Verify an access token; no registry lookup
    pub fn verify_bearer(&self, token: &str) -> Result<TokenPayload, DomainError> {
        self.codec.verify_access(token)
    }

    /// Rotate a refresh token into a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let result = self.refresh_inner(refresh_token).await;
        record_auth_event("refresh", &result);

        match &result {
            Ok(_) => {}
            Err(e) if e.is_token_error() => warn!(error = %e, "Refresh rejected"),
            Err(_) => {}
        }

        result
    }

    async fn refresh_inner(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let session = self
            .sessions
            .lookup(refresh_token)
            .await?
            .ok_or(DomainError::TokenInvalid)?;

        if session.is_expired() {
            self.sessions.revoke(refresh_token).await?;
            return Err(DomainError::TokenExpired);
        }

        let payload = match self.codec.verify_refresh(refresh_token) {
            Ok(p) => p,
            Err(DomainError::TokenExpired) => {
                self.sessions.revoke(refresh_token).await?;
                return Err(DomainError::TokenExpired);
            }
            Err(e) => return Err(e),
        };

        if payload.user_id != *session.user_id() {
            return Err(DomainError::TokenInvalid);
        }

        let user = self
            .users
            .get(&payload.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        // Username may have changed since the old token was issued
        let tokens = self.issue_pair(&TokenPayload::for_user(&user))?;

        self.sessions
            .rotate(
                refresh_token,
                &tokens.refresh_token,
                user.id(),
                self.codec.refresh_ttl(),
            )
            .await?;

        info!(user_id = %user.id(), "Refresh token rotated");

        Ok(tokens)
    }

    /// Revoke a refresh token. Succeeds whether or not it was outstanding.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), DomainError> {
        let result = self.sessions.revoke(refresh_token).await;
        record_auth_event("logout", &result);

        if result? {
            info!("Refresh session revoked");
        }

        Ok(())
    }

    /// Delete an account and every refresh session it still holds
    pub async fn delete_account(&self, user_id: &UserId) -> Result<(), DomainError> {
        let result = self.delete_account_inner(user_id).await;
        record_auth_event("delete_account", &result);

        let revoked = result?;
        info!(user_id = %user_id, revoked, "Account deleted");

        Ok(())
    }

    async fn delete_account_inner(&self, user_id: &UserId) -> Result<u64, DomainError> {
        if !self.users.delete(user_id).await? {
            return Err(DomainError::not_found("User not found"));
        }

        self.sessions.revoke_all_for_user(user_id).await
    }

    fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            access_token: self.codec.issue_access_token(payload)?,
            refresh_token: self.codec.issue_refresh_token(payload)?,
        })
    }
}

fn record_auth_event<T>(event: &'static str, result: &Result<T, DomainError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(DomainError::InvalidCredentials) => "invalid_credentials",
        Err(DomainError::TokenInvalid) => "token_invalid",
        Err(DomainError::TokenExpired) => "token_expired",
        Err(DomainError::Conflict { .. }) => "conflict",
        Err(DomainError::Validation { .. }) => "validation",
        Err(DomainError::NotFound { .. }) => "not_found",
        Err(_) => "error",
    };

    metrics::counter!("auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::session::MockSessionRepository;
    use crate::domain::RefreshSession;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::session::InMemorySessionRepository;
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, PasswordHashConfig};

    type TestAuthService = AuthService<InMemoryUserRepository, Argon2Hasher, InMemorySessionRepository>;

    struct Harness {
        auth: Arc<TestAuthService>,
        users: Arc<InMemoryUserRepository>,
        sessions: Arc<InMemorySessionRepository>,
    }

    fn fast_hasher() -> Arc<Argon2Hasher> {
        Arc::new(
            Argon2Hasher::with_config(PasswordHashConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        )
    }

    fn harness_with(config: JwtConfig) -> Harness {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtService::new(config).unwrap());

        let auth = AuthService::new(
            Arc::new(UserService::new(users.clone(), fast_hasher())),
            Arc::new(SessionService::new(sessions.clone())),
            codec,
        );

        Harness {
            auth: Arc::new(auth),
            users,
            sessions,
        }
    }

    fn harness() -> Harness {
        harness_with(JwtConfig::new("access-secret", "refresh-secret"))
    }

    fn alice() -> CreateUserRequest {
        CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password: "secret123".to_string(),
        }
    }

    async fn signed_in(h: &Harness) -> SigninResult {
        h.auth.signup(alice()).await.unwrap();
        h.auth.signin("a@x.com", "secret123").await.unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_flow() {
        let h = harness();

        let user = h.auth.signup(alice()).await.unwrap();
        assert_eq!(user.username(), "alice");

        let signin = h.auth.signin("a@x.com", "secret123").await.unwrap();
        assert_eq!(signin.user.password_hash(), "");

        let identity = h.auth.verify_bearer(&signin.tokens.access_token).unwrap();
        assert_eq!(identity.user_id, *user.id());
        assert_eq!(identity.username, "alice");

        let refreshed = h.auth.refresh(&signin.tokens.refresh_token).await.unwrap();
        assert_ne!(refreshed.refresh_token, signin.tokens.refresh_token);
        assert!(h.auth.verify_bearer(&refreshed.access_token).is_ok());

        let replay = h.auth.refresh(&signin.tokens.refresh_token).await;
        assert!(matches!(replay, Err(DomainError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_signin_records_exactly_one_session() {
        let h = harness();
        let signin = signed_in(&h).await;

        assert_eq!(h.sessions.len().await, 1);
        assert!(h
            .sessions
            .find_by_token(&signin.tokens.refresh_token)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_signin_serializes_without_hash() {
        let h = harness();
        let signin = signed_in(&h).await;

        let json = serde_json::to_value(&signin).unwrap();
        assert!(json["user"].get("passwordHash").is_none());
        assert!(json["tokens"]["accessToken"].is_string());
        assert!(json["tokens"]["refreshToken"].is_string());
    }

    #[tokio::test]
    async fn test_signin_failures_are_invalid_credentials() {
        let h = harness();
        h.auth.signup(alice()).await.unwrap();

        let wrong = h.auth.signin("a@x.com", "nope").await;
        let unknown = h.auth.signin("b@x.com", "secret123").await;

        assert!(matches!(wrong, Err(DomainError::InvalidCredentials)));
        assert!(matches!(unknown, Err(DomainError::InvalidCredentials)));
        assert!(h.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_rotation_replaces_row() {
        let h = harness();
        let signin = signed_in(&h).await;

        let refreshed = h.auth.refresh(&signin.tokens.refresh_token).await.unwrap();

        assert_eq!(h.sessions.len().await, 1);
        assert!(h
            .sessions
            .find_by_token(&signin.tokens.refresh_token)
            .await
            .unwrap()
            .is_none());
        assert!(h
            .sessions
            .find_by_token(&refreshed.refresh_token)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_has_one_winner() {
        let h = harness();
        let signin = signed_in(&h).await;
        let token = signin.tokens.refresh_token;

        let first = {
            let auth = h.auth.clone();
            let token = token.clone();
            tokio::spawn(async move { auth.refresh(&token).await })
        };
        let second = {
            let auth = h.auth.clone();
            let token = token.clone();
            tokio::spawn(async move { auth.refresh(&token).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::TokenInvalid))));
        assert_eq!(h.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token_is_invalid() {
        let h = harness();

        let result = h.auth.refresh("never-issued").await;
        assert!(matches!(result, Err(DomainError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_with_expired_row_deletes_it() {
        let h = harness();
        let signin = signed_in(&h).await;
        let token = signin.tokens.refresh_token;

        let session = h.sessions.find_by_token(&token).await.unwrap().unwrap();
        h.sessions.delete_by_token(&token).await.unwrap();
        h.sessions
            .insert(RefreshSession::new(
                token.clone(),
                *session.user_id(),
                Duration::seconds(-1),
            ))
            .await
            .unwrap();

        let result = h.auth.refresh(&token).await;
        assert!(matches!(result, Err(DomainError::TokenExpired)));
        assert!(h.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_with_expired_jwt_is_expired() {
        let h = harness();
        let user = h.auth.signup(alice()).await.unwrap();

        // Same secrets, but the signed expiry has already passed while the
        // registry row is still live
        let stale_codec = JwtService::new(
            JwtConfig::new("access-secret", "refresh-secret")
                .with_refresh_ttl(Duration::seconds(-10)),
        )
        .unwrap();
        let token = stale_codec
            .issue_refresh_token(&TokenPayload::for_user(&user))
            .unwrap();
        h.sessions
            .insert(RefreshSession::new(token.clone(), *user.id(), Duration::days(7)))
            .await
            .unwrap();

        let result = h.auth.refresh(&token).await;
        assert!(matches!(result, Err(DomainError::TokenExpired)));
        assert!(h.sessions.find_by_token(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_access_token_rejected_by_refresh() {
        let h = harness();
        let signin = signed_in(&h).await;

        // Even if an access token somehow got a registry row
        let access = signin.tokens.access_token;
        h.sessions
            .insert(RefreshSession::new(
                access.clone(),
                *signin.user.id(),
                Duration::days(7),
            ))
            .await
            .unwrap();

        let result = h.auth.refresh(&access).await;
        assert!(matches!(result, Err(DomainError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_bearer() {
        let h = harness();
        let signin = signed_in(&h).await;

        let result = h.auth.verify_bearer(&signin.tokens.refresh_token);
        assert!(matches!(result, Err(DomainError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_is_not_found() {
        let h = harness();
        let signin = signed_in(&h).await;

        h.users.delete(signin.user.id()).await.unwrap();

        let err = h.auth.refresh(&signin.tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(!err.to_string().contains(&signin.user.id().to_string()));
    }

    #[tokio::test]
    async fn test_delete_account_revokes_every_session() {
        let h = harness();
        let first = signed_in(&h).await;
        let second = h.auth.signin("a@x.com", "secret123").await.unwrap();
        let user_id = *first.user.id();

        // Another user's session must survive
        let mut bob = alice();
        bob.email = "b@x.com".to_string();
        bob.username = "bob".to_string();
        h.auth.signup(bob).await.unwrap();
        h.auth.signin("b@x.com", "secret123").await.unwrap();

        assert_eq!(h.sessions.len().await, 3);

        h.auth.delete_account(&user_id).await.unwrap();

        assert!(h.users.get(&user_id).await.unwrap().is_none());
        assert!(h.sessions.list_by_user(&user_id).await.unwrap().is_empty());
        assert_eq!(h.sessions.len().await, 1);

        for token in [first.tokens.refresh_token, second.tokens.refresh_token] {
            let result = h.auth.refresh(&token).await;
            assert!(matches!(result, Err(DomainError::TokenInvalid)));
        }
    }

    #[tokio::test]
    async fn test_delete_missing_account_is_not_found() {
        let h = harness();

        let result = h.auth.delete_account(&UserId::new()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_logout_revokes_and_is_idempotent() {
        let h = harness();
        let signin = signed_in(&h).await;
        let token = signin.tokens.refresh_token;

        h.auth.logout(&token).await.unwrap();
        assert!(h.sessions.is_empty().await);

        h.auth.logout(&token).await.unwrap();
        h.auth.logout("never-issued").await.unwrap();

        let result = h.auth.refresh(&token).await;
        assert!(matches!(result, Err(DomainError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflicts() {
        let h = harness();
        h.auth.signup(alice()).await.unwrap();

        let mut again = alice();
        again.username = "alice_two".to_string();

        let result = h.auth.signup(again).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_signin_fails_when_session_store_fails() {
        let users = Arc::new(InMemoryUserRepository::new());
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_insert()
            .returning(|_| Err(DomainError::storage("disk full")));

        let auth = AuthService::new(
            Arc::new(UserService::new(users, fast_hasher())),
            Arc::new(SessionService::new(Arc::new(sessions))),
            Arc::new(JwtService::new(JwtConfig::default()).unwrap()),
        );

        auth.signup(alice()).await.unwrap();

        let result = auth.signin("a@x.com", "secret123").await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
