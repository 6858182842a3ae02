//! Audit log of warehouse refreshes, stored alongside the star schema.

use super::convert::{parse_enum, parse_optional_timestamp, parse_timestamp, parse_uuid};
use super::pagination::Pagination;
use super::{DbError, DbPool};
use crate::etl::{EtlSync, EtlSyncStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait EtlSyncRepository: Send + Sync {
    async fn create(&self, sync: &EtlSync) -> Result<EtlSync, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<EtlSync>, DbError>;

    /// Persists status, finish time, row count and error message.
    async fn save(&self, sync: &EtlSync) -> Result<EtlSync, DbError>;

    /// Most recent first.
    async fn list(&self, pagination: &Pagination) -> Result<Vec<EtlSync>, DbError>;

    async fn count(&self) -> Result<u64, DbError>;

    /// The latest run, whatever its outcome.
    async fn latest(&self) -> Result<Option<EtlSync>, DbError>;
}

const COLUMNS: &str =
    "id, sync_type, status, started_at, finished_at, rows_processed, error_message";

pub struct SqliteEtlSyncRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteEtlSyncRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EtlSyncRepository for SqliteEtlSyncRepository {
    async fn create(&self, sync: &EtlSync) -> Result<EtlSync, DbError> {
        sqlx::query(&format!(
            "INSERT INTO etl_syncs ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(sync.id.to_string())
        .bind(&sync.sync_type)
        .bind(sync.status.as_db_str())
        .bind(sync.started_at.to_rfc3339())
        .bind(sync.finished_at.map(|d| d.to_rfc3339()))
        .bind(sync.rows_processed)
        .bind(&sync.error_message)
        .execute(&self.pool)
        .await?;

        Ok(sync.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<EtlSync>, DbError> {
        let row: Option<EtlSyncRow> =
            sqlx::query_as(&format!("SELECT {} FROM etl_syncs WHERE id = ?", COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(EtlSync::try_from).transpose()
    }

    async fn save(&self, sync: &EtlSync) -> Result<EtlSync, DbError> {
        let result = sqlx::query(
            "UPDATE etl_syncs SET status = ?, finished_at = ?, rows_processed = ?, error_message = ? WHERE id = ?",
        )
        .bind(sync.status.as_db_str())
        .bind(sync.finished_at.map(|d| d.to_rfc3339()))
        .bind(sync.rows_processed)
        .bind(&sync.error_message)
        .bind(sync.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "EtlSync".to_string(),
                id: sync.id.to_string(),
            });
        }

        Ok(sync.clone())
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<EtlSync>, DbError> {
        let rows: Vec<EtlSyncRow> = sqlx::query_as(&format!(
            "SELECT {} FROM etl_syncs ORDER BY started_at DESC, id LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EtlSync::try_from).collect()
    }

    async fn count(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM etl_syncs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn latest(&self) -> Result<Option<EtlSync>, DbError> {
        let row: Option<EtlSyncRow> = sqlx::query_as(&format!(
            "SELECT {} FROM etl_syncs ORDER BY started_at DESC LIMIT 1",
            COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(EtlSync::try_from).transpose()
    }
}

pub struct PgEtlSyncRepository {
    pool: sqlx::PgPool,
}

impl PgEtlSyncRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EtlSyncRepository for PgEtlSyncRepository {
    async fn create(&self, sync: &EtlSync) -> Result<EtlSync, DbError> {
        sqlx::query(&format!(
            "INSERT INTO etl_syncs ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            COLUMNS
        ))
        .bind(sync.id)
        .bind(&sync.sync_type)
        .bind(sync.status.as_db_str())
        .bind(sync.started_at)
        .bind(sync.finished_at)
        .bind(sync.rows_processed)
        .bind(&sync.error_message)
        .execute(&self.pool)
        .await?;

        Ok(sync.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<EtlSync>, DbError> {
        let row: Option<PgEtlSyncRow> =
            sqlx::query_as(&format!("SELECT {} FROM etl_syncs WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(EtlSync::try_from).transpose()
    }

    async fn save(&self, sync: &EtlSync) -> Result<EtlSync, DbError> {
        let result = sqlx::query(
            "UPDATE etl_syncs SET status = $2, finished_at = $3, rows_processed = $4, error_message = $5 WHERE id = $1",
        )
        .bind(sync.id)
        .bind(sync.status.as_db_str())
        .bind(sync.finished_at)
        .bind(sync.rows_processed)
        .bind(&sync.error_message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "EtlSync".to_string(),
                id: sync.id.to_string(),
            });
        }

        Ok(sync.clone())
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<EtlSync>, DbError> {
        let rows: Vec<PgEtlSyncRow> = sqlx::query_as(&format!(
            "SELECT {} FROM etl_syncs ORDER BY started_at DESC, id LIMIT $1 OFFSET $2",
            COLUMNS
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EtlSync::try_from).collect()
    }

    async fn count(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM etl_syncs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn latest(&self) -> Result<Option<EtlSync>, DbError> {
        let row: Option<PgEtlSyncRow> = sqlx::query_as(&format!(
            "SELECT {} FROM etl_syncs ORDER BY started_at DESC LIMIT 1",
            COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(EtlSync::try_from).transpose()
    }
}

pub fn create_etl_sync_repository(pool: &DbPool) -> Box<dyn EtlSyncRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteEtlSyncRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgEtlSyncRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct EtlSyncRow {
    id: String,
    sync_type: String,
    status: String,
    started_at: String,
    finished_at: Option<String>,
    rows_processed: i64,
    error_message: Option<String>,
}

impl TryFrom<EtlSyncRow> for EtlSync {
    type Error = DbError;

    fn try_from(row: EtlSyncRow) -> Result<Self, Self::Error> {
        Ok(EtlSync {
            id: parse_uuid(&row.id)?,
            sync_type: row.sync_type,
            status: parse_enum(&row.status, "etl_syncs.status", EtlSyncStatus::from_db_str)?,
            started_at: parse_timestamp(&row.started_at)?,
            finished_at: parse_optional_timestamp(row.finished_at)?,
            rows_processed: row.rows_processed,
            error_message: row.error_message,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgEtlSyncRow {
    id: Uuid,
    sync_type: String,
    status: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    rows_processed: i64,
    error_message: Option<String>,
}

impl TryFrom<PgEtlSyncRow> for EtlSync {
    type Error = DbError;

    fn try_from(row: PgEtlSyncRow) -> Result<Self, Self::Error> {
        Ok(EtlSync {
            id: row.id,
            sync_type: row.sync_type,
            status: parse_enum(&row.status, "etl_syncs.status", EtlSyncStatus::from_db_str)?,
            started_at: row.started_at,
            finished_at: row.finished_at,
            rows_processed: row.rows_processed,
            error_message: row.error_message,
        })
    }
}
