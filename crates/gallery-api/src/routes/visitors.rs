//! Visitor endpoints and their visit history.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{
    create_exhibition_repository, create_visitor_repository, PaginatedResult, Pagination,
    VisitFilter, VisitorFilter, VisitorRepository,
};
use gallery_core::{Visit, Visitor};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CreateVisitRequest, CreateVisitorRequest, ListVisitorsQuery, ListVisitsQuery,
    UpdateVisitorRequest, VisitResponse, VisitorResponse,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates visitor routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_visitors).post(create_visitor))
        .route(
            "/{id}",
            get(get_visitor).put(update_visitor).delete(delete_visitor),
        )
        .route("/{id}/visits", get(list_visits).post(create_visit))
}

/// Email must not belong to another live visitor.
async fn check_email_free(
    repo: &dyn VisitorRepository,
    visitor: &Visitor,
) -> Result<(), ApiError> {
    match repo.get_by_email(&visitor.email).await? {
        Some(existing) if existing.id != visitor.id => Err(ApiError::Conflict(format!(
            "A visitor with email {} already exists",
            visitor.email
        ))),
        _ => Ok(()),
    }
}

async fn list_visitors(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListVisitorsQuery>,
) -> Result<Json<PaginatedResult<VisitorResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = VisitorFilter {
        membership_type: query.membership_type,
        search: query.search,
    };

    let repo = create_visitor_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(VisitorResponse::from),
    ))
}

async fn create_visitor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVisitorRequest>,
) -> Result<(StatusCode, Json<VisitorResponse>), ApiError> {
    request.validate()?;

    let repo = create_visitor_repository(&state.db);
    let visitor = request.into_visitor();
    check_email_free(repo.as_ref(), &visitor).await?;

    let created = repo.create(&visitor).await?;
    info!(visitor_id = %created.id, "Visitor registered");

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_visitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<VisitorResponse>, ApiError> {
    let visitor = create_visitor_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Visitor", id))?;

    Ok(Json(visitor.into()))
}

async fn update_visitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateVisitorRequest>,
) -> Result<Json<VisitorResponse>, ApiError> {
    request.validate()?;

    let repo = create_visitor_repository(&state.db);
    let mut visitor = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Visitor", id))?;

    request.apply_to(&mut visitor);
    check_email_free(repo.as_ref(), &visitor).await?;

    let saved = repo.save(&visitor).await?;
    Ok(Json(saved.into()))
}

async fn delete_visitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_visitor_repository(&state.db).soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Visitor", id))
    }
}

async fn list_visits(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ListVisitsQuery>,
) -> Result<Json<PaginatedResult<VisitResponse>>, ApiError> {
    query.validate()?;

    let repo = create_visitor_repository(&state.db);
    if repo.get(id).await?.is_none() {
        return Err(ApiError::not_found("Visitor", id));
    }

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = VisitFilter {
        visitor_id: Some(id),
        exhibition_id: query.exhibition_id,
        from: query.from,
        to: query.to,
    };
    let items = repo.list_visits(&filter, &pagination).await?;
    let total = repo.count_visits(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(VisitResponse::from),
    ))
}

async fn create_visit(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CreateVisitRequest>,
) -> Result<(StatusCode, Json<VisitResponse>), ApiError> {
    request.validate()?;

    let repo = create_visitor_repository(&state.db);
    if repo.get(id).await?.is_none() {
        return Err(ApiError::not_found("Visitor", id));
    }
    if let Some(exhibition_id) = request.exhibition_id {
        if create_exhibition_repository(&state.db)
            .get(exhibition_id)
            .await?
            .is_none()
        {
            return Err(ApiError::not_found("Exhibition", exhibition_id));
        }
    }

    let mut visit = Visit::new(id, request.visit_date, request.ticket_price);
    visit.exhibition_id = request.exhibition_id;
    let created = repo.create_visit(&visit).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}
