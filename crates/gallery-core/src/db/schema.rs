//! Schema migrations for the operational database and the warehouse.
//!
//! Both migration sets use distinct version ranges and ignore each other's
//! entries, so they can share one physical database in development.

use super::{DbError, DbPool};
use tracing::info;

/// Runs the operational (OLTP) schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    match pool {
        DbPool::Sqlite(pool) => {
            info!("Running SQLite migrations");
            let mut migrator = sqlx::migrate!("src/db/migrations/sqlite");
            migrator.set_ignore_missing(true);
            migrator.run(pool).await?;
        }
        DbPool::Postgres(pool) => {
            info!("Running PostgreSQL migrations");
            let mut migrator = sqlx::migrate!("src/db/migrations/postgres");
            migrator.set_ignore_missing(true);
            migrator.run(pool).await?;
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

/// Runs the star-schema migrations on the warehouse database.
pub async fn run_warehouse_migrations(pool: &DbPool) -> Result<(), DbError> {
    match pool {
        DbPool::Sqlite(pool) => {
            info!("Running SQLite warehouse migrations");
            let mut migrator = sqlx::migrate!("src/db/migrations/warehouse_sqlite");
            migrator.set_ignore_missing(true);
            migrator.run(pool).await?;
        }
        DbPool::Postgres(pool) => {
            info!("Running PostgreSQL warehouse migrations");
            let mut migrator = sqlx::migrate!("src/db/migrations/warehouse_postgres");
            migrator.set_ignore_missing(true);
            migrator.run(pool).await?;
        }
    }

    info!("Warehouse migrations completed successfully");
    Ok(())
}
