//! API routes.

pub mod artworks;
pub mod etl;
pub mod exhibitions;
pub mod health;
pub mod insurances;
pub mod loans;
pub mod reports;
pub mod restorations;
pub mod staff;
pub mod statistics;
pub mod visitors;

use axum::{http::Uri, Router};
use chrono::NaiveDate;

use crate::error::ApiError;
use crate::state::AppState;

/// Creates the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Unversioned alias kept for the existing front end.
        .nest("/api", api_routes())
        .merge(health::routes())
        .fallback(route_not_found)
        .with_state(state)
}

/// API routes under the `/api` prefixes.
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/artworks", artworks::routes())
        .nest("/exhibitions", exhibitions::routes())
        .nest("/visitors", visitors::routes())
        .nest("/staff", staff::routes())
        .nest("/loans", loans::routes())
        .nest("/insurances", insurances::routes())
        .nest("/restorations", restorations::routes())
        .nest("/reports", reports::routes())
        .nest("/etl", etl::routes())
        .merge(statistics::routes())
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route matches {}", uri.path()))
}

/// Rejects a window whose end precedes its start.
pub(crate) fn check_date_range(
    field: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ApiError> {
    if end < start {
        return Err(ApiError::validation(
            field,
            format!("must be on or after the start date ({})", start),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_allows_single_day() {
        assert!(check_date_range("endDate", date(2024, 5, 1), date(2024, 5, 1)).is_ok());
        assert!(check_date_range("endDate", date(2024, 5, 2), date(2024, 5, 1)).is_err());
    }
}
