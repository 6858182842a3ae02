//! Warehouse refresh endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use gallery_core::db::{create_etl_sync_repository, PaginatedResult, Pagination, WarehouseSync};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{EtlSyncResponse, PageQuery};
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates ETL routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sync", post(run_sync))
        .route("/syncs", get(list_syncs))
        .route("/syncs/{id}", get(get_sync))
}

/// Runs a full refresh and returns its audit record.
///
/// A failed refresh is still recorded as `failed` before the error is
/// returned.
async fn run_sync(State(state): State<AppState>) -> Result<Json<EtlSyncResponse>, ApiError> {
    info!("Warehouse sync requested");
    let sync = WarehouseSync::new(&state.db, &state.warehouse).run().await?;
    Ok(Json(sync.into()))
}

async fn list_syncs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<PaginatedResult<EtlSyncResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let repo = create_etl_sync_repository(&state.warehouse);
    let items = repo.list(&pagination).await?;
    let total = repo.count().await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(EtlSyncResponse::from),
    ))
}

async fn get_sync(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<EtlSyncResponse>, ApiError> {
    let sync = create_etl_sync_repository(&state.warehouse)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("EtlSync", id))?;

    Ok(Json(sync.into()))
}
