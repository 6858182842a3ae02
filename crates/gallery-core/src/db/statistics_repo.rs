//! Dashboard statistics read straight from the operational schema.

use super::{DbError, DbPool};
use crate::reports::GalleryStatistics;
use async_trait::async_trait;

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    async fn get_statistics(&self) -> Result<GalleryStatistics, DbError>;
}

const ARTWORKS_BY_STATUS: &str =
    "SELECT status, COUNT(*) FROM artworks WHERE deleted_at IS NULL GROUP BY status";
const COLLECTION_VALUE: &str =
    "SELECT COALESCE(SUM(estimated_value), 0.0) FROM artworks WHERE deleted_at IS NULL";
const ACTIVE_EXHIBITIONS: &str =
    "SELECT COUNT(*) FROM exhibitions WHERE deleted_at IS NULL AND status = 'active'";
const TOTAL_VISITORS: &str = "SELECT COUNT(*) FROM visitors WHERE deleted_at IS NULL";
const TOTAL_STAFF: &str = "SELECT COUNT(*) FROM staff WHERE deleted_at IS NULL";
const ACTIVE_LOANS: &str =
    "SELECT COUNT(*) FROM loans WHERE deleted_at IS NULL AND status = 'active'";
const INSURED_VALUE: &str = "SELECT COALESCE(SUM(coverage_amount), 0.0) FROM insurances \
    WHERE deleted_at IS NULL AND status = 'active'";
const RESTORATIONS_IN_PROGRESS: &str =
    "SELECT COUNT(*) FROM restorations WHERE deleted_at IS NULL AND status = 'in_progress'";

pub struct SqliteStatisticsRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteStatisticsRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatisticsRepository for SqliteStatisticsRepository {
    async fn get_statistics(&self) -> Result<GalleryStatistics, DbError> {
        let by_status: Vec<(String, i64)> = sqlx::query_as(ARTWORKS_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;

        let mut stats = GalleryStatistics {
            artworks_by_status: by_status.into_iter().collect(),
            total_collection_value: sqlx::query_scalar(COLLECTION_VALUE)
                .fetch_one(&self.pool)
                .await?,
            active_exhibitions: sqlx::query_scalar(ACTIVE_EXHIBITIONS)
                .fetch_one(&self.pool)
                .await?,
            total_visitors: sqlx::query_scalar(TOTAL_VISITORS)
                .fetch_one(&self.pool)
                .await?,
            total_staff: sqlx::query_scalar(TOTAL_STAFF).fetch_one(&self.pool).await?,
            active_loans: sqlx::query_scalar(ACTIVE_LOANS).fetch_one(&self.pool).await?,
            total_insured_value: sqlx::query_scalar(INSURED_VALUE)
                .fetch_one(&self.pool)
                .await?,
            restorations_in_progress: sqlx::query_scalar(RESTORATIONS_IN_PROGRESS)
                .fetch_one(&self.pool)
                .await?,
            ..Default::default()
        };
        stats.recalculate_total();

        Ok(stats)
    }
}

pub struct PgStatisticsRepository {
    pool: sqlx::PgPool,
}

impl PgStatisticsRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatisticsRepository for PgStatisticsRepository {
    async fn get_statistics(&self) -> Result<GalleryStatistics, DbError> {
        let by_status: Vec<(String, i64)> = sqlx::query_as(ARTWORKS_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;

        let mut stats = GalleryStatistics {
            artworks_by_status: by_status.into_iter().collect(),
            total_collection_value: sqlx::query_scalar(COLLECTION_VALUE)
                .fetch_one(&self.pool)
                .await?,
            active_exhibitions: sqlx::query_scalar(ACTIVE_EXHIBITIONS)
                .fetch_one(&self.pool)
                .await?,
            total_visitors: sqlx::query_scalar(TOTAL_VISITORS)
                .fetch_one(&self.pool)
                .await?,
            total_staff: sqlx::query_scalar(TOTAL_STAFF).fetch_one(&self.pool).await?,
            active_loans: sqlx::query_scalar(ACTIVE_LOANS).fetch_one(&self.pool).await?,
            total_insured_value: sqlx::query_scalar(INSURED_VALUE)
                .fetch_one(&self.pool)
                .await?,
            restorations_in_progress: sqlx::query_scalar(RESTORATIONS_IN_PROGRESS)
                .fetch_one(&self.pool)
                .await?,
            ..Default::default()
        };
        stats.recalculate_total();

        Ok(stats)
    }
}

pub fn create_statistics_repository(pool: &DbPool) -> Box<dyn StatisticsRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteStatisticsRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgStatisticsRepository::new(pool.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::{Artwork, ArtworkStatus};
    use crate::db::{create_artwork_repository, test_pool};

    #[tokio::test]
    async fn test_empty_gallery_reports_zeros() {
        let pool = test_pool().await;
        let repo = create_statistics_repository(&pool);

        let stats = repo.get_statistics().await.unwrap();
        assert_eq!(stats, GalleryStatistics::default());
    }

    #[tokio::test]
    async fn test_total_equals_status_breakdown() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_statistics_repository(&pool);

        let mut on_display = Artwork::new("Lilies", "Monet", "painting", 300.0);
        on_display.status = ArtworkStatus::OnDisplay;
        artworks.create(&on_display).await.unwrap();
        artworks
            .create(&Artwork::new("Bust", "Rodin", "sculpture", 200.0))
            .await
            .unwrap();
        let removed = Artwork::new("Sketch", "Degas", "drawing", 50.0);
        artworks.create(&removed).await.unwrap();
        artworks.soft_delete(removed.id).await.unwrap();

        let stats = repo.get_statistics().await.unwrap();
        assert_eq!(stats.total_artworks, 2);
        assert_eq!(stats.artworks_by_status.values().sum::<i64>(), stats.total_artworks);
        assert_eq!(stats.artworks_by_status.get("on_display"), Some(&1));
        assert_eq!(stats.total_collection_value, 500.0);
    }
}
