//! Full refresh of the reporting warehouse from the operational schema.

use std::future::Future;
use std::time::Instant;

use tracing::{error, info, instrument};

use super::pagination::Pagination;
use super::retry::{with_retry, RetryConfig};
use super::{
    create_artwork_repository, create_etl_sync_repository, create_exhibition_repository,
    create_insurance_repository, create_loan_repository, create_restoration_repository,
    create_visitor_repository, create_warehouse_repository, ArtworkFilter, ArtworkRepository,
    DbError, DbPool, EtlSyncRepository, ExhibitionFilter, ExhibitionRepository, InsuranceFilter,
    InsuranceRepository, LoanFilter, LoanRepository, RestorationFilter, RestorationRepository,
    VisitFilter, VisitorRepository, WarehouseRepository,
};
use crate::etl::{EtlSync, FULL_REFRESH};
use crate::warehouse::WarehouseSnapshot;

/// Rebuilds the star schema and records each run in `etl_syncs`.
pub struct WarehouseSync {
    artworks: Box<dyn ArtworkRepository>,
    exhibitions: Box<dyn ExhibitionRepository>,
    visitors: Box<dyn VisitorRepository>,
    loans: Box<dyn LoanRepository>,
    restorations: Box<dyn RestorationRepository>,
    insurances: Box<dyn InsuranceRepository>,
    warehouse: Box<dyn WarehouseRepository>,
    syncs: Box<dyn EtlSyncRepository>,
    retry: RetryConfig,
}

impl WarehouseSync {
    pub fn new(oltp: &DbPool, warehouse: &DbPool) -> Self {
        Self {
            artworks: create_artwork_repository(oltp),
            exhibitions: create_exhibition_repository(oltp),
            visitors: create_visitor_repository(oltp),
            loans: create_loan_repository(oltp),
            restorations: create_restoration_repository(oltp),
            insurances: create_insurance_repository(oltp),
            warehouse: create_warehouse_repository(warehouse),
            syncs: create_etl_sync_repository(warehouse),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Runs one full refresh.
    ///
    /// The audit row is written as `running` first and updated with the
    /// outcome. On failure the row is marked `failed` and the original error
    /// is returned.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<EtlSync, DbError> {
        let mut sync = EtlSync::start(FULL_REFRESH);
        self.syncs.create(&sync).await?;
        info!(sync_id = %sync.id, "Warehouse sync started");

        let started = Instant::now();
        match self.refresh().await {
            Ok(rows) => {
                sync.succeed(rows as i64);
                self.syncs.save(&sync).await?;
                info!(
                    sync_id = %sync.id,
                    rows,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Warehouse sync succeeded"
                );
                Ok(sync)
            }
            Err(e) => {
                sync.fail(e.to_string());
                if let Err(save_err) = self.syncs.save(&sync).await {
                    error!(sync_id = %sync.id, error = %save_err, "Failed to record sync failure");
                }
                error!(sync_id = %sync.id, error = %e, "Warehouse sync failed");
                Err(e)
            }
        }
    }

    async fn refresh(&self) -> Result<u64, DbError> {
        let artworks = collect_pages(|page| async move {
            self.artworks.list(&ArtworkFilter::default(), &page).await
        })
        .await?;
        let exhibitions = collect_pages(|page| async move {
            self.exhibitions.list(&ExhibitionFilter::default(), &page).await
        })
        .await?;
        let visits = collect_pages(|page| async move {
            self.visitors.list_visits(&VisitFilter::default(), &page).await
        })
        .await?;
        let loans = collect_pages(|page| async move {
            self.loans.list(&LoanFilter::default(), &page).await
        })
        .await?;
        let restorations = collect_pages(|page| async move {
            self.restorations.list(&RestorationFilter::default(), &page).await
        })
        .await?;
        let insurances = collect_pages(|page| async move {
            self.insurances.list(&InsuranceFilter::default(), &page).await
        })
        .await?;

        let snapshot = WarehouseSnapshot::build(
            &artworks,
            &exhibitions,
            &visits,
            &loans,
            &restorations,
            &insurances,
        );

        with_retry(self.retry.clone(), "replace_snapshot", || {
            self.warehouse.replace_snapshot(&snapshot)
        })
        .await
    }
}

/// Reads every row of a paged listing.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, DbError>
where
    F: FnMut(Pagination) -> Fut,
    Fut: Future<Output = Result<Vec<T>, DbError>>,
{
    let mut rows = Vec::new();
    let mut page = 1;
    loop {
        let pagination = Pagination::all_rows(page);
        let batch = fetch(pagination).await?;
        let last = (batch.len() as u32) < pagination.limit();
        rows.extend(batch);
        if last {
            return Ok(rows);
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::Artwork;
    use crate::db::test_pool;
    use crate::etl::EtlSyncStatus;
    use crate::exhibition::Exhibition;
    use crate::visitor::{Visit, Visitor};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_collect_pages_walks_every_page() {
        let source: Vec<u32> = (0..450).collect();
        let rows = collect_pages(|page| {
            let slice: Vec<u32> = source
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .copied()
                .collect();
            async move { Ok::<_, DbError>(slice) }
        })
        .await
        .unwrap();
        assert_eq!(rows, source);
    }

    #[tokio::test]
    async fn test_sync_loads_live_rows_and_records_run() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let exhibitions = create_exhibition_repository(&pool);
        let visitors = create_visitor_repository(&pool);

        let kept = Artwork::new("Kept", "Hals", "painting", 100.0);
        let removed = Artwork::new("Removed", "Hals", "painting", 50.0);
        artworks.create(&kept).await.unwrap();
        artworks.create(&removed).await.unwrap();
        artworks.soft_delete(removed.id).await.unwrap();

        let exhibition = Exhibition::new("Golden Age", date(2024, 1, 1), date(2024, 6, 30));
        exhibitions.create(&exhibition).await.unwrap();

        let visitor = Visitor::new("Eva", "Sand", "eva@example.org");
        visitors.create(&visitor).await.unwrap();
        let mut visit = Visit::new(visitor.id, date(2024, 2, 10), 18.0);
        visit.exhibition_id = Some(exhibition.id);
        visitors.create_visit(&visit).await.unwrap();

        let sync = WarehouseSync::new(&pool, &pool)
            .with_retry_config(RetryConfig::no_retry())
            .run()
            .await
            .unwrap();

        assert_eq!(sync.status, EtlSyncStatus::Succeeded);
        // one date, one artwork, one exhibition, one visit
        assert_eq!(sync.rows_processed, 4);

        let warehouse = create_warehouse_repository(&pool);
        let categories = warehouse.category_values().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].total_value, 100.0);

        let stored = create_etl_sync_repository(&pool)
            .get(sync.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, EtlSyncStatus::Succeeded);
    }
}
