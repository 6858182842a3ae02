//! Analytical reports computed from the warehouse.
//!
//! Each handler reads one grouped aggregate from the star schema and hands it
//! to the matching report builder, which adds totals, percentage shares and
//! year-over-year growth. Reports reflect the last successful warehouse sync.

use axum::{extract::State, routing::get, Json, Router};
use gallery_core::db::create_warehouse_repository;
use gallery_core::{
    CollectionValueReport, ExhibitionPerformanceReport, InsuranceCoverageReport,
    LoanSummaryReport, RestorationCostReport, VisitorGrowthReport,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Creates report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collection-value", get(collection_value))
        .route("/visitor-growth", get(visitor_growth))
        .route("/exhibition-performance", get(exhibition_performance))
        .route("/loan-summary", get(loan_summary))
        .route("/restoration-costs", get(restoration_costs))
        .route("/insurance-coverage", get(insurance_coverage))
}

async fn collection_value(
    State(state): State<AppState>,
) -> Result<Json<CollectionValueReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .category_values()
        .await?;
    Ok(Json(CollectionValueReport::build(rows)))
}

async fn visitor_growth(
    State(state): State<AppState>,
) -> Result<Json<VisitorGrowthReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .visits_by_year()
        .await?;
    Ok(Json(VisitorGrowthReport::build(rows)))
}

async fn exhibition_performance(
    State(state): State<AppState>,
) -> Result<Json<ExhibitionPerformanceReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .exhibition_performance()
        .await?;
    Ok(Json(ExhibitionPerformanceReport::build(rows)))
}

async fn loan_summary(State(state): State<AppState>) -> Result<Json<LoanSummaryReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .loans_by_status()
        .await?;
    Ok(Json(LoanSummaryReport::build(rows)))
}

async fn restoration_costs(
    State(state): State<AppState>,
) -> Result<Json<RestorationCostReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .restorations_by_year()
        .await?;
    Ok(Json(RestorationCostReport::build(rows)))
}

async fn insurance_coverage(
    State(state): State<AppState>,
) -> Result<Json<InsuranceCoverageReport>, ApiError> {
    let rows = create_warehouse_repository(&state.warehouse)
        .insurance_by_provider()
        .await?;
    Ok(Json(InsuranceCoverageReport::build(rows)))
}
