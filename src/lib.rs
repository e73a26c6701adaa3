//! HireHub API
//!
//! Account and session backend for the HireHub job platform:
//! - Signup and signin with Argon2id password hashing
//! - Short-lived access tokens and rotating refresh tokens
//! - Server-side refresh session registry with background expiry sweeping
//! - Profile read and update for the authenticated user
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use domain::{SessionRepository, UserRepository};
use infrastructure::{
    auth::{AuthService, JwtService, TokenCodec},
    session::{InMemorySessionRepository, PostgresSessionRepository, SessionService},
    storage::{connect_pool, run_storage_migrations, StorageConfig, StorageType},
    user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService},
};

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    if config.auth.uses_dev_secrets() {
        warn!(
            "Using built-in development token secrets. Set APP__AUTH__ACCESS_TOKEN_SECRET and \
             APP__AUTH__REFRESH_TOKEN_SECRET before deploying."
        );
    }

    let hasher = Arc::new(
        Argon2Hasher::with_config(config.auth.password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash settings: {}", e))?,
    );
    let jwt_config = config
        .auth
        .jwt_config()
        .map_err(|e| anyhow::anyhow!("Invalid token settings: {}", e))?;
    let codec: Arc<dyn TokenCodec> = Arc::new(
        JwtService::new(jwt_config)
            .map_err(|e| anyhow::anyhow!("Invalid token settings: {}", e))?,
    );

    let storage = config.storage.resolve().map_err(anyhow::Error::msg)?;
    info!("Storage backend: {:?}", storage.storage_type());

    let state = match storage {
        StorageConfig::Postgres(pg_config) => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(&pg_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let applied = run_storage_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
            if applied > 0 {
                info!(applied, "Applied storage migrations");
            }

            build_app_state(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresSessionRepository::new(pool)),
                hasher,
                codec,
                StorageType::Postgres,
            )
        }
        StorageConfig::InMemory => {
            info!("Using in-memory storage; accounts and sessions are lost on restart");

            build_app_state(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemorySessionRepository::new()),
                hasher,
                codec,
                StorageType::InMemory,
            )
        }
    };

    Ok(state)
}

/// Wire the services over concrete repositories and erase them behind the state traits
fn build_app_state<R, S>(
    user_repository: Arc<R>,
    session_repository: Arc<S>,
    hasher: Arc<Argon2Hasher>,
    codec: Arc<dyn TokenCodec>,
    storage_type: StorageType,
) -> AppState
where
    R: UserRepository + 'static,
    S: SessionRepository + 'static,
{
    let user_service = Arc::new(UserService::new(user_repository, hasher));
    let session_service = Arc::new(SessionService::new(session_repository));
    let auth_service = AuthService::new(user_service.clone(), session_service.clone(), codec);

    AppState {
        auth_service: Arc::new(auth_service),
        user_service,
        session_purger: session_service,
        storage_type,
    }
}
