//! JWT token issuance and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::domain::auth::{TokenKind, TokenPayload};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Development-only signing secret for access tokens
pub const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-me";
/// Development-only signing secret for refresh tokens
pub const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-me";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Token kind
    pub token_type: TokenKind,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Unique token ID
    pub jti: String,
}

impl JwtClaims {
    /// Create claims for a payload that expire after `ttl`
    pub fn new(payload: &TokenPayload, kind: TokenKind, ttl: Duration, issuer: &str) -> Self {
        let now = Utc::now();

        Self {
            sub: payload.user_id.to_string(),
            username: payload.username.clone(),
            token_type: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Convert the claims back into the identity they carry
    pub fn payload(&self) -> Result<TokenPayload, DomainError> {
        let user_id = UserId::parse(&self.sub).ok_or(DomainError::TokenInvalid)?;
        Ok(TokenPayload::new(user_id, self.username.clone()))
    }
}

/// Configuration for JWT service
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// Value of the `iss` claim
    pub issuer: String,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"[hidden]")
            .field("refresh_secret", &"[hidden]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    /// Create a configuration with separate access and refresh secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            issuer: "hirehub-api".to_string(),
        }
    }
}

/// Stateless token codec
///
/// Verification never consults storage. `TokenExpired` is returned only when the
/// signature, issuer and token kind all check out and the expiry has passed; every
/// other failure is `TokenInvalid`.
#[cfg_attr(test, automock)]
pub trait TokenCodec: Send + Sync + Debug {
    /// Issue a short-lived access token
    fn issue_access_token(&self, payload: &TokenPayload) -> Result<String, DomainError>;

    /// Issue a long-lived refresh token
    fn issue_refresh_token(&self, payload: &TokenPayload) -> Result<String, DomainError>;

    /// Verify a token of either kind
    fn verify(&self, token: &str) -> Result<TokenPayload, DomainError>;

    /// Verify a token that must be an access token
    fn verify_access(&self, token: &str) -> Result<TokenPayload, DomainError>;

    /// Verify a token that must be a refresh token
    fn verify_refresh(&self, token: &str) -> Result<TokenPayload, DomainError>;

    /// Lifetime given to refresh tokens and their sessions
    fn refresh_ttl(&self) -> Duration;
}

/// HS256 JWT codec
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Result<Self, DomainError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(DomainError::configuration("JWT signing secrets must not be empty"));
        }

        // Expiry is checked after the token kind in `decode_as`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(Self {
            access_encoding_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
            config,
        })
    }

    fn issue(&self, payload: &TokenPayload, kind: TokenKind) -> Result<String, DomainError> {
        let (ttl, key) = match kind {
            TokenKind::Access => (self.config.access_ttl, &self.access_encoding_key),
            TokenKind::Refresh => (self.config.refresh_ttl, &self.refresh_encoding_key),
        };

        let claims = JwtClaims::new(payload, kind, ttl, &self.config.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| DomainError::internal(format!("Failed to sign JWT: {}", e)))
    }

    fn decode_as(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, DomainError> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding_key,
            TokenKind::Refresh => &self.refresh_decoding_key,
        };

        let data = decode::<JwtClaims>(token, key, &self.validation)
            .map_err(|_| DomainError::TokenInvalid)?;

        if data.claims.token_type != kind {
            return Err(DomainError::TokenInvalid);
        }

        if data.claims.exp < Utc::now().timestamp() {
            return Err(DomainError::TokenExpired);
        }

        data.claims.payload()
    }
}

impl TokenCodec for JwtService {
    fn issue_access_token(&self, payload: &TokenPayload) -> Result<String, DomainError> {
        self.issue(payload, TokenKind::Access)
    }

    fn issue_refresh_token(&self, payload: &TokenPayload) -> Result<String, DomainError> {
        self.issue(payload, TokenKind::Refresh)
    }

    fn verify(&self, token: &str) -> Result<TokenPayload, DomainError> {
        match self.decode_as(token, TokenKind::Access) {
            Err(DomainError::TokenInvalid) => self.decode_as(token, TokenKind::Refresh),
            other => other,
        }
    }

    fn verify_access(&self, token: &str) -> Result<TokenPayload, DomainError> {
        self.decode_as(token, TokenKind::Access)
    }

    fn verify_refresh(&self, token: &str) -> Result<TokenPayload, DomainError> {
        self.decode_as(token, TokenKind::Refresh)
    }

    fn refresh_ttl(&self) -> Duration {
        self.config.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new("access-secret", "refresh-secret")).unwrap()
    }

    fn payload() -> TokenPayload {
        TokenPayload::new(UserId::new(), "alice")
    }

    #[test]
    fn test_issue_then_verify_round_trips_payload() {
        let service = create_service();
        let payload = payload();

        let access = service.issue_access_token(&payload).unwrap();
        let refresh = service.issue_refresh_token(&payload).unwrap();

        assert_eq!(service.verify(&access).unwrap(), payload);
        assert_eq!(service.verify(&refresh).unwrap(), payload);
    }

    #[test]
    fn test_tokens_issued_together_differ() {
        let service = create_service();
        let payload = payload();

        let first = service.issue_refresh_token(&payload).unwrap();
        let second = service.issue_refresh_token(&payload).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_expired_not_invalid() {
        let service = JwtService::new(
            JwtConfig::new("access-secret", "refresh-secret")
                .with_access_ttl(Duration::seconds(-10))
                .with_refresh_ttl(Duration::seconds(-10)),
        )
        .unwrap();
        let payload = payload();

        let access = service.issue_access_token(&payload).unwrap();
        let refresh = service.issue_refresh_token(&payload).unwrap();

        assert!(matches!(service.verify(&access), Err(DomainError::TokenExpired)));
        assert!(matches!(service.verify_refresh(&refresh), Err(DomainError::TokenExpired)));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let service = create_service();
        let token = service.issue_access_token(&payload()).unwrap();
        let other = service
            .issue_access_token(&TokenPayload::new(UserId::new(), "mallory"))
            .unwrap();

        // Mallory's claims under Alice's signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(service.verify(&tampered), Err(DomainError::TokenInvalid)));
        assert!(matches!(service.verify("not-a-jwt"), Err(DomainError::TokenInvalid)));
        assert!(matches!(service.verify(""), Err(DomainError::TokenInvalid)));
    }

    #[test]
    fn test_foreign_secret_is_invalid() {
        let service = create_service();
        let other = JwtService::new(JwtConfig::new("other-access", "other-refresh")).unwrap();

        let token = other.issue_access_token(&payload()).unwrap();
        assert!(matches!(service.verify(&token), Err(DomainError::TokenInvalid)));
    }

    #[test]
    fn test_foreign_issuer_is_invalid() {
        let service = create_service();
        let other = JwtService::new(
            JwtConfig::new("access-secret", "refresh-secret").with_issuer("someone-else"),
        )
        .unwrap();

        let token = other.issue_access_token(&payload()).unwrap();
        assert!(matches!(service.verify(&token), Err(DomainError::TokenInvalid)));
    }

    #[test]
    fn test_kind_is_enforced() {
        let service = create_service();
        let payload = payload();

        let access = service.issue_access_token(&payload).unwrap();
        let refresh = service.issue_refresh_token(&payload).unwrap();

        assert!(service.verify_access(&access).is_ok());
        assert!(service.verify_refresh(&refresh).is_ok());
        assert!(matches!(service.verify_access(&refresh), Err(DomainError::TokenInvalid)));
        assert!(matches!(service.verify_refresh(&access), Err(DomainError::TokenInvalid)));
    }

    #[test]
    fn test_kind_is_enforced_with_shared_secret() {
        let service = JwtService::new(JwtConfig::new("shared", "shared")).unwrap();
        let refresh = service.issue_refresh_token(&payload()).unwrap();

        assert!(matches!(service.verify_access(&refresh), Err(DomainError::TokenInvalid)));
        assert!(service.verify(&refresh).is_ok());
    }

    #[test]
    fn test_expired_token_of_wrong_kind_is_invalid() {
        let service = JwtService::new(
            JwtConfig::new("shared", "shared")
                .with_access_ttl(Duration::seconds(-10))
                .with_refresh_ttl(Duration::seconds(-10)),
        )
        .unwrap();
        let payload = payload();

        let access = service.issue_access_token(&payload).unwrap();
        let refresh = service.issue_refresh_token(&payload).unwrap();

        assert!(matches!(service.verify_access(&refresh), Err(DomainError::TokenInvalid)));
        assert!(matches!(service.verify_refresh(&access), Err(DomainError::TokenInvalid)));
        assert!(matches!(service.verify_refresh(&refresh), Err(DomainError::TokenExpired)));
        assert!(matches!(service.verify(&refresh), Err(DomainError::TokenExpired)));
    }

    #[test]
    fn test_expired_token_with_foreign_signature_is_invalid() {
        let service = create_service();
        let other = JwtService::new(
            JwtConfig::new("other-access", "other-refresh").with_access_ttl(Duration::seconds(-10)),
        )
        .unwrap();

        let token = other.issue_access_token(&payload()).unwrap();
        assert!(matches!(service.verify(&token), Err(DomainError::TokenInvalid)));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtService::new(JwtConfig::new("", "refresh"));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", create_service());

        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
        assert!(debug.contains("[hidden]"));
    }
}
