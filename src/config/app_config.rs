use chrono::Duration;
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::auth::{JwtConfig, DEV_ACCESS_SECRET, DEV_REFRESH_SECRET};
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};
use crate::infrastructure::user::PasswordHashConfig;

/// Upper bound for `auth.access_token_ttl_minutes` (one day)
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// Upper bound for `auth.refresh_token_ttl_days`
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub auth: AuthConfig,
    pub sessions: SessionsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub issuer: String,
    pub password_hash: PasswordHashConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_token_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            issuer: "hirehub-api".to_string(),
            password_hash: PasswordHashConfig::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"[hidden]")
            .field("refresh_token_secret", &"[hidden]")
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("issuer", &self.issuer)
            .field("password_hash", &self.password_hash)
            .finish()
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AuthConfig {
    /// Whether either signing secret is still the built-in development value
    pub fn uses_dev_secrets(&self) -> bool {
        self.access_token_secret == DEV_ACCESS_SECRET
            || self.refresh_token_secret == DEV_REFRESH_SECRET
    }

    /// Codec configuration for these settings
    ///
    /// Token lifetimes must be positive and no longer than
    /// [`MAX_ACCESS_TOKEN_TTL_MINUTES`] and [`MAX_REFRESH_TOKEN_TTL_DAYS`].
    pub fn jwt_config(&self) -> Result<JwtConfig, DomainError> {
        check_ttl(
            "auth.access_token_ttl_minutes",
            self.access_token_ttl_minutes,
            MAX_ACCESS_TOKEN_TTL_MINUTES,
        )?;
        check_ttl(
            "auth.refresh_token_ttl_days",
            self.refresh_token_ttl_days,
            MAX_REFRESH_TOKEN_TTL_DAYS,
        )?;

        Ok(
            JwtConfig::new(&self.access_token_secret, &self.refresh_token_secret)
                .with_access_ttl(Duration::minutes(self.access_token_ttl_minutes))
                .with_refresh_ttl(Duration::days(self.refresh_token_ttl_days))
                .with_issuer(&self.issuer),
        )
    }
}

fn check_ttl(key: &str, value: i64, max: i64) -> Result<(), DomainError> {
    if value <= 0 || value > max {
        return Err(DomainError::configuration(format!(
            "{} must be between 1 and {}, got {}",
            key, max, value
        )));
    }

    Ok(())
}

impl StorageSettings {
    /// Resolve the backend selection, falling back to `DATABASE_URL`
    pub fn resolve(&self) -> Result<StorageConfig, String> {
        match StorageType::from_str(&self.backend) {
            Some(StorageType::InMemory) => Ok(StorageConfig::in_memory()),
            Some(StorageType::Postgres) => {
                let url = self
                    .database_url
                    .clone()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| {
                        "storage.database_url or DATABASE_URL is required for postgres".to_string()
                    })?;

                Ok(StorageConfig::Postgres(
                    PostgresConfig::new(url)
                        .with_max_connections(self.max_connections)
                        .with_connect_timeout(self.connect_timeout_secs),
                ))
            }
            None => Err(format!("Unknown storage backend '{}'", self.backend)),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.auth.access_token_ttl_minutes, 15);
        assert_eq!(config.auth.refresh_token_ttl_days, 7);
        assert_eq!(config.sessions.sweep_interval_secs, 60);
        assert!(config.metrics.enabled);
        assert!(config.auth.uses_dev_secrets());
    }

    #[test]
    fn test_partial_sources_keep_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("auth.access_token_secret", "prod-access")
            .unwrap()
            .set_override("auth.refresh_token_secret", "prod-refresh")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.refresh_token_ttl_days, 7);
        assert!(!config.auth.uses_dev_secrets());
    }

    #[test]
    fn test_jwt_config_from_auth() {
        let auth = AuthConfig {
            access_token_ttl_minutes: 5,
            refresh_token_ttl_days: 1,
            ..Default::default()
        };

        let jwt = auth.jwt_config().unwrap();
        assert_eq!(jwt.access_ttl, Duration::minutes(5));
        assert_eq!(jwt.refresh_ttl, Duration::days(1));
        assert_eq!(jwt.issuer, "hirehub-api");
    }

    #[test]
    fn test_jwt_config_rejects_out_of_range_ttls() {
        for (access, refresh) in [
            (-5, 7),
            (0, 7),
            (MAX_ACCESS_TOKEN_TTL_MINUTES + 1, 7),
            (15, 0),
            (15, -1),
            (15, i64::MAX),
        ] {
            let auth = AuthConfig {
                access_token_ttl_minutes: access,
                refresh_token_ttl_days: refresh,
                ..Default::default()
            };

            let result = auth.jwt_config();
            assert!(
                matches!(result, Err(DomainError::Configuration { .. })),
                "accepted access={} refresh={}",
                access,
                refresh
            );
        }
    }

    #[test]
    fn test_jwt_config_accepts_upper_bounds() {
        let auth = AuthConfig {
            access_token_ttl_minutes: MAX_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_days: MAX_REFRESH_TOKEN_TTL_DAYS,
            ..Default::default()
        };

        assert!(auth.jwt_config().is_ok());
    }

    #[test]
    fn test_resolve_storage() {
        let memory = StorageSettings::default().resolve().unwrap();
        assert_eq!(memory.storage_type(), StorageType::InMemory);

        let postgres = StorageSettings {
            backend: "postgres".to_string(),
            database_url: Some("postgres://db/app".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(postgres.storage_type(), StorageType::Postgres);

        let unknown = StorageSettings {
            backend: "mongodb".to_string(),
            ..Default::default()
        }
        .resolve();
        assert!(unknown.is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", AuthConfig::default());
        assert!(!debug.contains(DEV_ACCESS_SECRET));
    }
}
