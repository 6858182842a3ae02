//! Dashboard statistics read from the operational schema.

use axum::{extract::State, routing::get, Json, Router};
use gallery_core::db::create_statistics_repository;
use gallery_core::GalleryStatistics;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/statistics", get(get_statistics))
}

async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<GalleryStatistics>, ApiError> {
    let stats = create_statistics_repository(&state.db)
        .get_statistics()
        .await?;
    Ok(Json(stats))
}
