//! Staff endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{create_staff_repository, PaginatedResult, Pagination, StaffFilter};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateStaffRequest, ListStaffQuery, StaffResponse, UpdateStaffRequest};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates staff routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route(
            "/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

async fn list_staff(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListStaffQuery>,
) -> Result<Json<PaginatedResult<StaffResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = StaffFilter {
        role: query.role,
        department: query.department,
        search: query.search,
    };

    let repo = create_staff_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(StaffResponse::from),
    ))
}

async fn create_staff(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<StaffResponse>), ApiError> {
    request.validate()?;

    let repo = create_staff_repository(&state.db);
    if repo.get_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "A staff member with email {} already exists",
            request.email
        )));
    }

    let staff = repo.create(&request.into_staff()).await?;
    info!(staff_id = %staff.id, role = %staff.role.as_db_str(), "Staff member added");

    Ok((StatusCode::CREATED, Json(staff.into())))
}

async fn get_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StaffResponse>, ApiError> {
    let staff = create_staff_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Staff", id))?;

    Ok(Json(staff.into()))
}

async fn update_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateStaffRequest>,
) -> Result<Json<StaffResponse>, ApiError> {
    request.validate()?;

    let repo = create_staff_repository(&state.db);
    let mut staff = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Staff", id))?;

    request.apply_to(&mut staff);
    if let Some(other) = repo.get_by_email(&staff.email).await? {
        if other.id != staff.id {
            return Err(ApiError::Conflict(format!(
                "A staff member with email {} already exists",
                staff.email
            )));
        }
    }

    let saved = repo.save(&staff).await?;
    Ok(Json(saved.into()))
}

async fn delete_staff(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_staff_repository(&state.db).soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Staff", id))
    }
}
