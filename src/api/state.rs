//! Application state for shared services

use std::sync::Arc;

use crate::domain::auth::{TokenPair, TokenPayload};
use crate::domain::session::SessionRepository;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::{AuthService, SigninResult};
use crate::infrastructure::session::SessionPurger;
use crate::infrastructure::storage::StorageType;
use crate::infrastructure::user::{
    CreateUserRequest, PasswordHasher, UpdateProfileRequest, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub session_purger: Arc<dyn SessionPurger>,
    pub storage_type: StorageType,
}

/// Trait for the auth flow operations
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn signup(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn signin(&self, email: &str, password: &str) -> Result<SigninResult, DomainError>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError>;
    async fn logout(&self, refresh_token: &str) -> Result<(), DomainError>;
    async fn delete_account(&self, user_id: &UserId) -> Result<(), DomainError>;
    /// Verify an access token without touching storage
    fn verify_bearer(&self, token: &str) -> Result<TokenPayload, DomainError>;
}

/// Trait for profile operations on the authenticated user
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;
    async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError>;
}

#[async_trait::async_trait]
impl<R, H, S> AuthServiceTrait for AuthService<R, H, S>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
    S: SessionRepository + 'static,
{
    async fn signup(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        AuthService::signup(self, request).await
    }

    async fn signin(&self, email: &str, password: &str) -> Result<SigninResult, DomainError> {
        AuthService::signin(self, email, password).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        AuthService::refresh(self, refresh_token).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), DomainError> {
        AuthService::logout(self, refresh_token).await
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), DomainError> {
        AuthService::delete_account(self, user_id).await
    }

    fn verify_bearer(&self, token: &str) -> Result<TokenPayload, DomainError> {
        AuthService::verify_bearer(self, token)
    }
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        UserService::update_profile(self, id, request).await
    }
}
