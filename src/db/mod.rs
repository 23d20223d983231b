//! Persistence: pool, embedded migrations and repositories

pub mod connection;
pub mod repositories;

use sqlx::{
    migrate::{MigrateError, Migrator},
    PgPool,
};

pub use connection::{create_pool, test_connection};

/// Schema migrations compiled into the binary
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
