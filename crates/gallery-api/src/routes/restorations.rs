//! Restoration endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{
    create_artwork_repository, create_restoration_repository, create_staff_repository,
    PaginatedResult, Pagination, RestorationFilter,
};
use gallery_core::Restoration;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::check_date_range;
use crate::dto::{
    CreateRestorationRequest, ListRestorationsQuery, RestorationResponse,
    UpdateRestorationRequest,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates restoration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restorations).post(create_restoration))
        .route(
            "/{id}",
            get(get_restoration)
                .put(update_restoration)
                .delete(delete_restoration),
        )
}

async fn check_restoration(state: &AppState, restoration: &Restoration) -> Result<(), ApiError> {
    if let Some(end) = restoration.end_date {
        check_date_range("endDate", restoration.start_date, end)?;
    }

    if let Some(conservator_id) = restoration.conservator_id {
        if create_staff_repository(&state.db)
            .get(conservator_id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found("Staff", conservator_id));
        }
    }
    Ok(())
}

async fn list_restorations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListRestorationsQuery>,
) -> Result<Json<PaginatedResult<RestorationResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = RestorationFilter {
        artwork_id: query.artwork_id,
        status: query.status,
        conservator_id: query.conservator_id,
    };

    let repo = create_restoration_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(RestorationResponse::from),
    ))
}

async fn create_restoration(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRestorationRequest>,
) -> Result<(StatusCode, Json<RestorationResponse>), ApiError> {
    request.validate()?;

    if create_artwork_repository(&state.db)
        .get(request.artwork_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Artwork", request.artwork_id));
    }

    let restoration = request.into_restoration();
    check_restoration(&state, &restoration).await?;

    let created = create_restoration_repository(&state.db)
        .create(&restoration)
        .await?;
    info!(restoration_id = %created.id, artwork_id = %created.artwork_id, "Restoration scheduled");

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_restoration(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<RestorationResponse>, ApiError> {
    let restoration = create_restoration_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Restoration", id))?;

    Ok(Json(restoration.into()))
}

async fn update_restoration(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateRestorationRequest>,
) -> Result<Json<RestorationResponse>, ApiError> {
    request.validate()?;

    let repo = create_restoration_repository(&state.db);
    let mut restoration = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Restoration", id))?;

    request.apply_to(&mut restoration);
    check_restoration(&state, &restoration).await?;

    let saved = repo.save(&restoration).await?;
    Ok(Json(saved.into()))
}

async fn delete_restoration(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_restoration_repository(&state.db).soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Restoration", id))
    }
}
