//! Database layer for the gallery backend.
//!
//! Provides the connection pools, migrations and repository implementations
//! for both the operational schema and the reporting warehouse, on SQLite
//! (development and tests) and PostgreSQL (production).

mod convert;
mod error;
mod pagination;
mod pool;
mod retry;
mod schema;

pub mod artwork_repo;
pub mod etl_sync_repo;
pub mod exhibition_repo;
pub mod insurance_repo;
pub mod loan_repo;
pub mod restoration_repo;
pub mod staff_repo;
pub mod statistics_repo;
pub mod sync;
pub mod visitor_repo;
pub mod warehouse_repo;

pub use error::DbError;
pub use pagination::{PaginatedResult, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use pool::{
    create_pool, create_pool_with_options, escape_like_pattern, make_like_pattern, DbPool,
    PoolOptions,
};
pub use retry::{is_transient_error, with_retry, RetryConfig};
pub use schema::{run_migrations, run_warehouse_migrations};

pub use artwork_repo::{create_artwork_repository, ArtworkFilter, ArtworkRepository};
pub use etl_sync_repo::{create_etl_sync_repository, EtlSyncRepository};
pub use exhibition_repo::{create_exhibition_repository, ExhibitionFilter, ExhibitionRepository};
pub use insurance_repo::{create_insurance_repository, InsuranceFilter, InsuranceRepository};
pub use loan_repo::{create_loan_repository, LoanFilter, LoanRepository};
pub use restoration_repo::{
    create_restoration_repository, RestorationFilter, RestorationRepository,
};
pub use staff_repo::{create_staff_repository, StaffFilter, StaffRepository};
pub use statistics_repo::{create_statistics_repository, StatisticsRepository};
pub use sync::WarehouseSync;
pub use visitor_repo::{
    create_visitor_repository, VisitFilter, VisitorFilter, VisitorRepository,
};
pub use warehouse_repo::{create_warehouse_repository, WarehouseRepository};

/// A private in-memory SQLite database with both schemas applied.
///
/// The pool holds exactly one connection for its whole life, since the
/// database disappears when that connection closes.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = create_pool_with_options(
        "sqlite::memory:",
        PoolOptions {
            max_connections: 1,
            min_connections: 1,
            max_lifetime: None,
            idle_timeout: None,
            ..PoolOptions::default()
        },
    )
    .await
    .expect("in-memory pool");
    run_migrations(&pool).await.expect("operational migrations");
    run_warehouse_migrations(&pool)
        .await
        .expect("warehouse migrations");
    pool
}
