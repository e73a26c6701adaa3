//! Storage infrastructure - backend selection, PostgreSQL pool and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageType};
pub use migrations::{run_storage_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
pub(crate) use postgres::unique_violation;
