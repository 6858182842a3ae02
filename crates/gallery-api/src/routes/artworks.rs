//! Artwork endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{Datelike, Utc};
use gallery_core::db::{
    create_artwork_repository, create_insurance_repository, create_loan_repository,
    create_restoration_repository, ArtworkFilter, InsuranceFilter, LoanFilter, PaginatedResult,
    Pagination, RestorationFilter,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    ArtworkResponse, CreateArtworkRequest, InsuranceResponse, ListArtworksQuery, LoanResponse,
    PageQuery, RestorationResponse, UpdateArtworkRequest,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates artwork routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artworks).post(create_artwork))
        .route(
            "/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/{id}/loans", get(list_artwork_loans))
        .route("/{id}/insurances", get(list_artwork_insurances))
        .route("/{id}/restorations", get(list_artwork_restorations))
}

fn check_year_created(year: Option<i32>) -> Result<(), ApiError> {
    let current = Utc::now().year();
    match year {
        Some(y) if y > current => Err(ApiError::validation(
            "yearCreated",
            format!("cannot be later than {}", current),
        )),
        _ => Ok(()),
    }
}

async fn ensure_artwork_exists(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    create_artwork_repository(&state.db)
        .get(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Artwork", id))
}

async fn list_artworks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListArtworksQuery>,
) -> Result<Json<PaginatedResult<ArtworkResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = ArtworkFilter {
        status: query.status,
        category: query.category,
        artist: query.artist,
        search: query.search,
    };

    let repo = create_artwork_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(ArtworkResponse::from),
    ))
}

async fn create_artwork(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<ArtworkResponse>), ApiError> {
    request.validate()?;
    check_year_created(request.year_created)?;

    let artwork = create_artwork_repository(&state.db)
        .create(&request.into_artwork())
        .await?;
    info!(artwork_id = %artwork.id, title = %artwork.title, "Artwork created");

    Ok((StatusCode::CREATED, Json(artwork.into())))
}

async fn get_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ArtworkResponse>, ApiError> {
    let artwork = create_artwork_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artwork", id))?;

    Ok(Json(artwork.into()))
}

async fn update_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateArtworkRequest>,
) -> Result<Json<ArtworkResponse>, ApiError> {
    request.validate()?;

    let repo = create_artwork_repository(&state.db);
    let mut artwork = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artwork", id))?;

    request.apply_to(&mut artwork);
    check_year_created(artwork.year_created)?;

    let saved = repo.save(&artwork).await?;
    Ok(Json(saved.into()))
}

/// Soft-deletes an artwork unless a loan still holds it.
async fn delete_artwork(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = create_artwork_repository(&state.db);
    if repo.get(id).await?.is_none() {
        return Err(ApiError::not_found("Artwork", id));
    }

    let active_loans = create_loan_repository(&state.db)
        .count_reserving_for_artwork(id)
        .await?;
    if active_loans > 0 {
        return Err(ApiError::BusinessRule(format!(
            "Artwork {} has {} active or approved loan(s) and cannot be deleted",
            id, active_loans
        )));
    }

    if repo.soft_delete(id).await? {
        info!(artwork_id = %id, "Artwork deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Artwork", id))
    }
}

async fn list_artwork_loans(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<PaginatedResult<LoanResponse>>, ApiError> {
    query.validate()?;
    ensure_artwork_exists(&state, id).await?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = LoanFilter {
        artwork_id: Some(id),
        ..Default::default()
    };
    let repo = create_loan_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(LoanResponse::from),
    ))
}

async fn list_artwork_insurances(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<PaginatedResult<InsuranceResponse>>, ApiError> {
    query.validate()?;
    ensure_artwork_exists(&state, id).await?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = InsuranceFilter {
        artwork_id: Some(id),
        ..Default::default()
    };
    let repo = create_insurance_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(InsuranceResponse::from),
    ))
}

async fn list_artwork_restorations(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<PaginatedResult<RestorationResponse>>, ApiError> {
    query.validate()?;
    ensure_artwork_exists(&state, id).await?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = RestorationFilter {
        artwork_id: Some(id),
        ..Default::default()
    };
    let repo = create_restoration_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(RestorationResponse::from),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_year_is_rejected() {
        let next_year = Utc::now().year() + 1;
        assert!(check_year_created(Some(next_year)).is_err());
        assert!(check_year_created(Some(1889)).is_ok());
        assert!(check_year_created(None).is_ok());
    }
}
