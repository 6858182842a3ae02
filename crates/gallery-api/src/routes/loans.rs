//! Loan endpoints.
//!
//! An artwork can be held by at most one approved or active loan at a time,
//! and an artwork in restoration cannot be loaned at all.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use gallery_core::db::{
    create_artwork_repository, create_loan_repository, LoanFilter, LoanRepository,
    PaginatedResult, Pagination,
};
use gallery_core::{Loan, LoanStatus};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::check_date_range;
use crate::dto::{CreateLoanRequest, ListLoansQuery, LoanResponse, UpdateLoanRequest};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Creates loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_loans).post(create_loan))
        .route(
            "/{id}",
            get(get_loan).put(update_loan).delete(delete_loan),
        )
}

/// Loans that are closed never conflict.
fn is_open(status: LoanStatus) -> bool {
    !matches!(status, LoanStatus::Returned | LoanStatus::Cancelled)
}

async fn check_no_overlap(
    repo: &dyn LoanRepository,
    loan: &Loan,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    if !is_open(loan.status) {
        return Ok(());
    }

    let conflicts = repo
        .find_conflicting(loan.artwork_id, loan.start_date, loan.end_date, exclude)
        .await?;
    if let Some(existing) = conflicts.first() {
        return Err(ApiError::BusinessRule(format!(
            "Artwork {} is already on loan to {} from {} to {}",
            loan.artwork_id, existing.institution, existing.start_date, existing.end_date
        )));
    }
    Ok(())
}

async fn list_loans(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListLoansQuery>,
) -> Result<Json<PaginatedResult<LoanResponse>>, ApiError> {
    query.validate()?;

    let pagination = Pagination::from_query(query.page, query.per_page);
    let filter = LoanFilter {
        artwork_id: query.artwork_id,
        status: query.status,
        direction: query.direction,
    };

    let repo = create_loan_repository(&state.db);
    let items = repo.list(&filter, &pagination).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(
        PaginatedResult::new(items, total, &pagination).map(LoanResponse::from),
    ))
}

async fn create_loan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    request.validate()?;
    check_date_range("endDate", request.start_date, request.end_date)?;

    let artwork = create_artwork_repository(&state.db)
        .get(request.artwork_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Artwork", request.artwork_id))?;
    if !artwork.status.can_be_loaned() {
        return Err(ApiError::BusinessRule(format!(
            "Artwork '{}' is in restoration and cannot be loaned",
            artwork.title
        )));
    }

    let repo = create_loan_repository(&state.db);
    let loan = request.into_loan();
    check_no_overlap(repo.as_ref(), &loan, None).await?;

    let created = repo.create(&loan).await?;
    info!(
        loan_id = %created.id,
        artwork_id = %created.artwork_id,
        institution = %created.institution,
        "Loan created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_loan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = create_loan_repository(&state.db)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Loan", id))?;

    Ok(Json(loan.into()))
}

async fn update_loan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    request.validate()?;

    let repo = create_loan_repository(&state.db);
    let mut loan = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Loan", id))?;

    request.apply_to(&mut loan);
    check_date_range("endDate", loan.start_date, loan.end_date)?;
    check_no_overlap(repo.as_ref(), &loan, Some(id)).await?;

    let saved = repo.save(&loan).await?;
    info!(loan_id = %id, status = %saved.status.as_db_str(), "Loan updated");
    Ok(Json(saved.into()))
}

async fn delete_loan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if create_loan_repository(&state.db).soft_delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Loan", id))
    }
}
