//! Migrate command - applies the PostgreSQL schema and exits

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    connect_pool, run_storage_migrations, PostgresMigrator, StorageConfig,
};

/// Apply pending migrations against the configured database
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let pg_config = match config.storage.resolve().map_err(anyhow::Error::msg)? {
        StorageConfig::Postgres(pg_config) => pg_config,
        StorageConfig::InMemory => {
            anyhow::bail!("migrate requires storage.backend = \"postgres\"");
        }
    };

    let pool = connect_pool(&pg_config).await?;
    let applied = run_storage_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool.clone()).current_version().await?;

    info!(applied, version = ?version, "Migrations complete");
    pool.close().await;

    Ok(())
}
