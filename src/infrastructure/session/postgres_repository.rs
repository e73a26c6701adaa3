//! PostgreSQL refresh session repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::session::{RefreshSession, SessionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::unique_violation;

/// PostgreSQL implementation of SessionRepository
#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (token, user_id, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.token())
        .bind(session.user_id().as_uuid())
        .bind(session.expires_at())
        .bind(session.created_at())
        .bind(session.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_storage(e, "insert"))?;

        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT token, user_id, expires_at, created_at, updated_at
            FROM refresh_sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get refresh session: {}", e)))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete refresh session: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace(
        &self,
        old_token: &str,
        replacement: RefreshSession,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin rotation: {}", e)))?;

        // The row lock taken by DELETE makes a concurrent rotation of the same token
        // wait for this commit and then see zero rows.
        let deleted = sqlx::query("DELETE FROM refresh_sessions WHERE token = $1")
            .bind(old_token)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete refresh session: {}", e)))?;

        if deleted.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DomainError::storage(format!("Failed to roll back rotation: {}", e)))?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (token, user_id, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(replacement.token())
        .bind(replacement.user_id().as_uuid())
        .bind(replacement.expires_at())
        .bind(replacement.created_at())
        .bind(replacement.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_storage(e, "rotate"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit rotation: {}", e)))?;

        Ok(true)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<RefreshSession>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT token, user_id, expires_at, created_at, updated_at
            FROM refresh_sessions
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list refresh sessions: {}", e)))?;

        rows.iter().map(row_to_session).collect()
    }

    async fn delete_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete refresh sessions: {}", e))
            })?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to purge expired sessions: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

fn conflict_or_storage(err: sqlx::Error, action: &str) -> DomainError {
    match unique_violation(&err) {
        Some(_) => DomainError::conflict("Refresh session already exists"),
        None => DomainError::storage(format!("Failed to {} refresh session: {}", action, err)),
    }
}

fn row_to_session(row: &sqlx::postgres::PgRow) -> Result<RefreshSession, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid refresh session row: {}", e));

    let user_id: uuid::Uuid = row.try_get("user_id").map_err(read)?;

    Ok(RefreshSession::restore(
        row.try_get("token").map_err(read)?,
        UserId::from_uuid(user_id),
        row.try_get("expires_at").map_err(read)?,
        row.try_get("created_at").map_err(read)?,
        row.try_get("updated_at").map_err(read)?,
    ))
}
