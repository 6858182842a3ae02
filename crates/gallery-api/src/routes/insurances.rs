//! Insurance policy endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{
    create_artwork_repository, create_insurance_repository, InsuranceFilter, PaginatedResult,
    Pagination,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::check_date_range;
use crate::dto::{
    CreateInsuranceRequest, InsuranceResponse, ListInsurancesQuery, UpdateInsuranceRequest,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates insurance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_insurances).post(create_insurance))
        .route(
            "/{id}",
            get(get_insurance)
                .put(update_insurance)
                .delete(delete_insurance),
        )
}

async fn list_insurances(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListInsurancesQuery>,
) -> Result<Json<PaginatedResult<InsuranceResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = InsuranceFilter {
        artwork_id: query.artwork_id,
        status: query.status,
        provider: query.provider,
    };

    let repo = create_insurance_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(InsuranceResponse::from),
    ))
}

async fn create_insurance(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateInsuranceRequest>,
) -> Result<(StatusCode, Json<InsuranceResponse>), ApiError> {
    request.validate()?;
    check_date_range("endDate", request.start_date, request.end_date)?;

    if create_artwork_repository(&state.db)
        .get(request.artwork_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Artwork", request.artwork_id));
    }

    // A duplicate policy number surfaces as ORA-00001 (409).
    let created = create_insurance_repository(&state.db)
        .create(&request.into_insurance())
        .await?;
    info!(insurance_id = %created.id, provider = %created.provider, "Insurance policy created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_insurance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<InsuranceResponse>, ApiError> {
    let insurance = create_insurance_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Insurance", id))?;

    Ok(Json(insurance.into()))
}

async fn update_insurance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateInsuranceRequest>,
) -> Result<Json<InsuranceResponse>, ApiError> {
    request.validate()?;

    let repo = create_insurance_repository(&state.db);
    let mut insurance = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Insurance", id))?;

    request.apply_to(&mut insurance);
    check_date_range("endDate", insurance.start_date, insurance.end_date)?;

    let saved = repo.save(&insurance).await?;
    Ok(Json(saved.into()))
}

async fn delete_insurance(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_insurance_repository(&state.db).soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Insurance", id))
    }
}
