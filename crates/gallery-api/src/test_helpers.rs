//! Shared test helpers for the gallery-api crate.

use gallery_core::db::{
    create_pool_with_options, run_migrations, run_warehouse_migrations, DbPool, PoolOptions,
};

use crate::state::AppState;

/// A private in-memory database with both schemas.
///
/// One connection held for the pool's lifetime keeps the database alive.
pub async fn setup_test_db() -> DbPool {
    let pool = create_pool_with_options(
        "sqlite::memory:",
        PoolOptions {
            max_connections: 1,
            min_connections: 1,
            max_lifetime: None,
            idle_timeout: None,
            ..PoolOptions::default()
        },
    )
    .await
    .expect("Failed to create SQLite pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run operational migrations");
    run_warehouse_migrations(&pool)
        .await
        .expect("Failed to run warehouse migrations");

    pool
}

/// Application state over a single test database.
pub async fn create_test_state() -> AppState {
    AppState::single(setup_test_db().await)
}
