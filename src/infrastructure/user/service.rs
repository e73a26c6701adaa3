//! User service: the credential store and profile management

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::user::{
    normalize_email, validate_email, validate_name, validate_password, validate_username,
    SocialLinks, User, UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Hashed once per service and verified against when the email is unknown
const UNKNOWN_USER_PASSWORD: &str = "hirehub-unknown-user-placeholder";

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Partial profile update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub profile_image: Option<String>,
}

/// User service for credential handling and profile management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    /// Same cost parameters as real hashes, so both signin failures take as long
    unknown_user_hash: Arc<OnceCell<String>>,
}

impl<R: UserRepository, H: PasswordHasher + 'static> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            repository,
            hasher,
            unknown_user_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create a new user and return it without its password hash
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        let name = request.name.trim().to_string();

        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_username(&username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name(&name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        // Checked up front so a duplicate costs no hashing; the repository's own
        // uniqueness check still decides races.
        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict("Email already registered"));
        }

        if self.repository.username_exists(&username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = User::new(&email, username, name, password_hash);

        let created = self.repository.create(user).await?;
        info!(user_id = %created.id(), username = %created.username(), "User created");

        Ok(created.sanitized())
    }

    /// Verify an email/password pair
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`. The returned
    /// user still carries its password hash and must not be handed to clients as is.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = normalize_email(email);

        let user = match self.repository.get_by_email(&email).await? {
            Some(u) => u,
            None => {
                debug!("Signin attempt for unknown email");
                self.verify_unknown_user(password.to_string()).await?;
                return Err(DomainError::InvalidCredentials);
            }
        };

        if !self
            .verify_password(password.to_string(), user.password_hash().to_string())
            .await?
        {
            debug!(user_id = %user.id(), "Signin attempt with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Apply a partial profile update
    pub async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            validate_name(&name).map_err(|e| DomainError::validation(e.to_string()))?;
            user.set_name(name);
        }

        if let Some(username) = request.username {
            let username = username.trim().to_string();

            if username != user.username() {
                validate_username(&username)
                    .map_err(|e| DomainError::validation(e.to_string()))?;
                user.set_username(username);
            }
        }

        let profile = user.profile_mut();

        if let Some(bio) = request.bio {
            profile.bio = bio.trim().to_string();
        }

        if let Some(skills) = request.skills {
            profile.skills = skills;
        }

        if let Some(location) = request.location {
            profile.location = location.trim().to_string();
        }

        if let Some(website) = request.website {
            profile.website = website.trim().to_string();
        }

        if let Some(social_links) = request.social_links {
            profile.social_links = social_links;
        }

        if let Some(profile_image) = request.profile_image {
            profile.profile_image = profile_image;
        }

        let updated = self.repository.update(&user).await?;
        info!(user_id = %id, "User profile updated");

        Ok(updated.sanitized())
    }

    /// Delete a user
    pub async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        self.repository.delete(id).await
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
    }

    /// Spend one full verification on a placeholder hash; the result is discarded
    async fn verify_unknown_user(&self, password: String) -> Result<(), DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let placeholder = Arc::clone(&self.unknown_user_hash);

        tokio::task::spawn_blocking(move || -> Result<(), DomainError> {
            let hash = placeholder.get_or_try_init(|| hasher.hash(UNKNOWN_USER_PASSWORD))?;
            let _ = hasher.verify(&password, hash);
            Ok(())
        })
        .await
        .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))?
    }
}
