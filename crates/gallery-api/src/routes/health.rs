//! Health check endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::DbPool;
use std::time::Instant;

use crate::dto::{DatabaseHealth, HealthResponse};
use crate::state::AppState;

/// Start time for uptime calculation.
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

async fn database_health(pool: &DbPool) -> DatabaseHealth {
    DatabaseHealth {
        connected: pool.is_healthy().await,
        backend: pool.db_type().to_string(),
        pool_size: pool.pool_size(),
        idle_connections: pool.idle_connections(),
    }
}

/// Overall health of both databases.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_health(&state.db).await;
    let warehouse = database_health(&state.warehouse).await;
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    // Reports degrade without the warehouse; CRUD does not.
    let (status, http_status) = match (database.connected, warehouse.connected) {
        (true, true) => ("healthy", StatusCode::OK),
        (true, false) => ("degraded", StatusCode::OK),
        _ => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            warehouse,
            uptime_seconds: uptime,
        }),
    )
}

/// Readiness probe: both databases answer.
async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.db.is_healthy().await && state.warehouse.is_healthy().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness probe.
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}
