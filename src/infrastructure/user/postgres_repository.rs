//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::user::{SocialLinks, User, UserId, UserProfile, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::unique_violation;

const USER_COLUMNS: &str = "id, email, username, name, password_hash, is_verified, \
     profile_image, bio, location, website, skills, social_links, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a single user by a unique text column
    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by {}: {}", column, e)))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_by("email", email).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_by("username", username).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let profile = user.profile();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, name, password_hash, is_verified,
                               profile_image, bio, location, website, skills, social_links,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.username())
        .bind(user.name())
        .bind(user.password_hash())
        .bind(user.is_verified())
        .bind(&profile.profile_image)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(&profile.skills)
        .bind(Json(&profile.social_links))
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_storage(e, &user, "create"))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let profile = user.profile();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, name = $4, password_hash = $5, is_verified = $6,
                profile_image = $7, bio = $8, location = $9, website = $10, skills = $11,
                social_links = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email())
        .bind(user.username())
        .bind(user.name())
        .bind(user.password_hash())
        .bind(user.is_verified())
        .bind(&profile.profile_image)
        .bind(&profile.bio)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(&profile.skills)
        .bind(Json(&profile.social_links))
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_storage(e, user, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                user.id()
            )));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn conflict_or_storage(err: sqlx::Error, user: &User, action: &str) -> DomainError {
    match unique_violation(&err) {
        Some(constraint) if constraint.contains("username") => DomainError::conflict(format!(
            "Username '{}' already exists",
            user.username()
        )),
        Some(constraint) if constraint.contains("email") => {
            DomainError::conflict("Email already registered")
        }
        Some(_) => DomainError::conflict(format!("User with ID '{}' already exists", user.id())),
        None => DomainError::storage(format!("Failed to {} user: {}", action, err)),
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: uuid::Uuid = row.try_get("id").map_err(read)?;
    let Json(social_links): Json<SocialLinks> = row.try_get("social_links").map_err(read)?;

    let profile = UserProfile {
        profile_image: row.try_get("profile_image").map_err(read)?,
        bio: row.try_get("bio").map_err(read)?,
        location: row.try_get("location").map_err(read)?,
        website: row.try_get("website").map_err(read)?,
        skills: row.try_get("skills").map_err(read)?,
        social_links,
    };

    Ok(User::restore(
        UserId::from_uuid(id),
        row.try_get("email").map_err(read)?,
        row.try_get("username").map_err(read)?,
        row.try_get("name").map_err(read)?,
        row.try_get("password_hash").map_err(read)?,
        row.try_get("is_verified").map_err(read)?,
        profile,
        row.try_get("created_at").map_err(read)?,
        row.try_get("updated_at").map_err(read)?,
    ))
}
