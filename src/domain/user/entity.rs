//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::normalize_email;

/// Profile image assigned to new accounts
pub const DEFAULT_PROFILE_IMAGE: &str = "https://example.com/default-profile-image.png";

/// User identifier - a random UUID assigned at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse from the string form carried in token claims
    pub fn parse(id: &str) -> Option<Self> {
        Uuid::parse_str(id).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Links to a user's external profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

/// Public profile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub profile_image: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub skills: Vec<String>,
    pub social_links: SocialLinks,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
            bio: String::new(),
            location: String::new(),
            website: String::new(),
            skills: Vec::new(),
            social_links: SocialLinks::default(),
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    /// Always stored normalized (trimmed, lowercase)
    email: String,
    username: String,
    name: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    is_verified: bool,
    #[serde(flatten)]
    profile: UserProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unverified user with a default profile
    pub fn new(
        email: &str,
        username: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::new(),
            email: normalize_email(email),
            username: username.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            is_verified: false,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        email: String,
        username: String,
        name: String,
        password_hash: String,
        is_verified: bool,
        profile: UserProfile,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            username,
            name,
            password_hash,
            is_verified,
            profile,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.touch();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Mutable access to the profile; bumps `updated_at`
    pub fn profile_mut(&mut self) -> &mut UserProfile {
        self.touch();
        &mut self.profile
    }

    /// Copy of this user with the password hash cleared
    pub fn sanitized(&self) -> Self {
        Self {
            password_hash: String::new(),
            ..self.clone()
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
