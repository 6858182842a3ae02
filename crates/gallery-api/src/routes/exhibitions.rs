//! Exhibition endpoints, including the artworks placed in each exhibition.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{
    create_artwork_repository, create_exhibition_repository, create_staff_repository,
    ExhibitionFilter, PaginatedResult, Pagination,
};
use gallery_core::{Exhibition, ExhibitionArtwork};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::check_date_range;
use crate::dto::{
    AddExhibitionArtworkRequest, CreateExhibitionRequest, ExhibitionArtworkResponse,
    ExhibitionResponse, ListExhibitionsQuery, UpdateExhibitionRequest,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates exhibition routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exhibitions).post(create_exhibition))
        .route(
            "/{id}",
            get(get_exhibition)
                .put(update_exhibition)
                .delete(delete_exhibition),
        )
        .route(
            "/{id}/artworks",
            get(list_exhibition_artworks).post(add_exhibition_artwork),
        )
        .route(
            "/{id}/artworks/{artwork_id}",
            axum::routing::delete(remove_exhibition_artwork),
        )
}

/// Date window and curator reference.
async fn check_exhibition(state: &AppState, exhibition: &Exhibition) -> Result<(), ApiError> {
    check_date_range("endDate", exhibition.start_date, exhibition.end_date)?;

    if let Some(curator_id) = exhibition.curator_id {
        if create_staff_repository(&state.db)
            .get(curator_id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found("Staff", curator_id));
        }
    }
    Ok(())
}

async fn load_exhibition(state: &AppState, id: Uuid) -> Result<Exhibition, ApiError> {
    create_exhibition_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Exhibition", id))
}

async fn list_exhibitions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListExhibitionsQuery>,
) -> Result<Json<PaginatedResult<ExhibitionResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = ExhibitionFilter {
        status: query.status,
        curator_id: query.curator_id,
        running_on: query.running_on,
        search: query.search,
    };

    let repo = create_exhibition_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(ExhibitionResponse::from),
    ))
}

async fn create_exhibition(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateExhibitionRequest>,
) -> Result<(StatusCode, Json<ExhibitionResponse>), ApiError> {
    request.validate()?;

    let exhibition = request.into_exhibition();
    check_exhibition(&state, &exhibition).await?;

    let created = create_exhibition_repository(&state.db)
        .create(&exhibition)
        .await?;
    info!(exhibition_id = %created.id, title = %created.title, "Exhibition created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_exhibition(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ExhibitionResponse>, ApiError> {
    Ok(Json(load_exhibition(&state, id).await?.into()))
}

async fn update_exhibition(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateExhibitionRequest>,
) -> Result<Json<ExhibitionResponse>, ApiError> {
    request.validate()?;

    let mut exhibition = load_exhibition(&state, id).await?;
    request.apply_to(&mut exhibition);
    check_exhibition(&state, &exhibition).await?;

    let saved = create_exhibition_repository(&state.db)
        .save(&exhibition)
        .await?;
    Ok(Json(saved.into()))
}

async fn delete_exhibition(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_exhibition_repository(&state.db).soft_delete(id).await? {
        info!(exhibition_id = %id, "Exhibition deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Exhibition", id))
    }
}

/// Artworks in display order, each with its current record.
async fn list_exhibition_artworks(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<ExhibitionArtworkResponse>>, ApiError> {
    load_exhibition(&state, id).await?;

    let placements = create_exhibition_repository(&state.db)
        .list_artworks(id)
        .await?;
    let artworks = create_artwork_repository(&state.db);

    let mut items = Vec::with_capacity(placements.len());
    for placement in placements {
        let artwork = artworks.get(placement.artwork_id).await?;
        items.push(ExhibitionArtworkResponse::new(placement, artwork));
    }

    Ok(Json(items))
}

async fn add_exhibition_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddExhibitionArtworkRequest>,
) -> Result<(StatusCode, Json<ExhibitionArtworkResponse>), ApiError> {
    request.validate()?;

    let exhibition = load_exhibition(&state, id).await?;
    if !exhibition.status.accepts_artworks() {
        return Err(ApiError::BusinessRule(format!(
            "Exhibition '{}' is {} and no longer accepts artworks",
            exhibition.title,
            exhibition.status.as_db_str()
        )));
    }

    let artwork = create_artwork_repository(&state.db)
        .get(request.artwork_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artwork", request.artwork_id))?;

    let repo = create_exhibition_repository(&state.db);
    if repo.has_artwork(id, artwork.id).await? {
        return Err(ApiError::Conflict(format!(
            "Artwork '{}' is already part of exhibition '{}'",
            artwork.title, exhibition.title
        )));
    }

    let display_order = match request.display_order {
        Some(order) => order,
        None => repo.list_artworks(id).await?.len() as i32 + 1,
    };

    let placement = repo
        .add_artwork(&ExhibitionArtwork::new(id, artwork.id, display_order))
        .await?;
    info!(exhibition_id = %id, artwork_id = %artwork.id, display_order, "Artwork added to exhibition");

    Ok((
        StatusCode::CREATED,
        Json(ExhibitionArtworkResponse::new(placement, Some(artwork))),
    ))
}

async fn remove_exhibition_artwork(
    State(state): State<AppState>,
    ApiPath((id, artwork_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    load_exhibition(&state, id).await?;

    if create_exhibition_repository(&state.db)
        .remove_artwork(id, artwork_id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "Artwork {} is not part of exhibition {}",
            artwork_id, id
        )))
    }
}
