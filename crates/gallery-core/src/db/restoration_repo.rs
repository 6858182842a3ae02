//! Restoration job repository.

use super::convert::{
    date_str, parse_date, parse_enum, parse_optional_date, parse_optional_timestamp,
    parse_optional_uuid, parse_timestamp, parse_uuid,
};
use super::pagination::Pagination;
use super::{DbError, DbPool};
use crate::restoration::{Restoration, RestorationStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct RestorationFilter {
    pub artwork_id: Option<Uuid>,
    pub status: Option<RestorationStatus>,
    pub conservator_id: Option<Uuid>,
}

#[async_trait]
pub trait RestorationRepository: Send + Sync {
    async fn create(&self, restoration: &Restoration) -> Result<Restoration, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Restoration>, DbError>;

    async fn list(
        &self,
        filter: &RestorationFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Restoration>, DbError>;

    async fn count(&self, filter: &RestorationFilter) -> Result<u64, DbError>;

    async fn save(&self, restoration: &Restoration) -> Result<Restoration, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;
}

const COLUMNS: &str = "id, artwork_id, conservator_id, description, start_date, end_date, cost, \
    status, created_at, updated_at, deleted_at";

pub struct SqliteRestorationRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteRestorationRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &RestorationFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(artwork_id) = filter.artwork_id {
            clause.push_str(" AND artwork_id = ?");
            binds.push(artwork_id.to_string());
        }
        if let Some(status) = filter.status {
            clause.push_str(" AND status = ?");
            binds.push(status.as_db_str().to_string());
        }
        if let Some(conservator_id) = filter.conservator_id {
            clause.push_str(" AND conservator_id = ?");
            binds.push(conservator_id.to_string());
        }

        (clause, binds)
    }
}

#[async_trait]
impl RestorationRepository for SqliteRestorationRepository {
    async fn create(&self, restoration: &Restoration) -> Result<Restoration, DbError> {
        sqlx::query(&format!(
            "INSERT INTO restorations ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(restoration.id.to_string())
        .bind(restoration.artwork_id.to_string())
        .bind(restoration.conservator_id.map(|id| id.to_string()))
        .bind(&restoration.description)
        .bind(date_str(restoration.start_date))
        .bind(restoration.end_date.map(date_str))
        .bind(restoration.cost)
        .bind(restoration.status.as_db_str())
        .bind(restoration.created_at.to_rfc3339())
        .bind(restoration.updated_at.to_rfc3339())
        .bind(restoration.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(restoration.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Restoration>, DbError> {
        let row: Option<RestorationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM restorations WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Restoration::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RestorationFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Restoration>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM restorations{} ORDER BY start_date DESC, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, RestorationRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Restoration::try_from).collect()
    }

    async fn count(&self, filter: &RestorationFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM restorations{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, restoration: &Restoration) -> Result<Restoration, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE restorations SET
                artwork_id = ?, conservator_id = ?, description = ?, start_date = ?, end_date = ?,
                cost = ?, status = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(restoration.artwork_id.to_string())
        .bind(restoration.conservator_id.map(|id| id.to_string()))
        .bind(&restoration.description)
        .bind(date_str(restoration.start_date))
        .bind(restoration.end_date.map(date_str))
        .bind(restoration.cost)
        .bind(restoration.status.as_db_str())
        .bind(Utc::now().to_rfc3339())
        .bind(restoration.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Restoration".to_string(),
                id: restoration.id.to_string(),
            });
        }

        self.get(restoration.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Restoration".to_string(),
            id: restoration.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE restorations SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgRestorationRepository {
    pool: sqlx::PgPool,
}

impl PgRestorationRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::uuid IS NULL OR artwork_id = $1)
      AND ($2::text IS NULL OR status = $2)
      AND ($3::uuid IS NULL OR conservator_id = $3)
"#;

#[async_trait]
impl RestorationRepository for PgRestorationRepository {
    async fn create(&self, restoration: &Restoration) -> Result<Restoration, DbError> {
        sqlx::query(&format!(
            "INSERT INTO restorations ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            COLUMNS
        ))
        .bind(restoration.id)
        .bind(restoration.artwork_id)
        .bind(restoration.conservator_id)
        .bind(&restoration.description)
        .bind(restoration.start_date)
        .bind(restoration.end_date)
        .bind(restoration.cost)
        .bind(restoration.status.as_db_str())
        .bind(restoration.created_at)
        .bind(restoration.updated_at)
        .bind(restoration.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(restoration.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Restoration>, DbError> {
        let row: Option<PgRestorationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM restorations WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Restoration::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RestorationFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Restoration>, DbError> {
        let rows: Vec<PgRestorationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM restorations {} ORDER BY start_date DESC, id LIMIT $4 OFFSET $5",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.artwork_id)
        .bind(filter.status.map(|s| s.as_db_str()))
        .bind(filter.conservator_id)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Restoration::try_from).collect()
    }

    async fn count(&self, filter: &RestorationFilter) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM restorations {}", PG_FILTER))
                .bind(filter.artwork_id)
                .bind(filter.status.map(|s| s.as_db_str()))
                .bind(filter.conservator_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn save(&self, restoration: &Restoration) -> Result<Restoration, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE restorations SET
                artwork_id = $2, conservator_id = $3, description = $4, start_date = $5,
                end_date = $6, cost = $7, status = $8, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(restoration.id)
        .bind(restoration.artwork_id)
        .bind(restoration.conservator_id)
        .bind(&restoration.description)
        .bind(restoration.start_date)
        .bind(restoration.end_date)
        .bind(restoration.cost)
        .bind(restoration.status.as_db_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Restoration".to_string(),
                id: restoration.id.to_string(),
            });
        }

        self.get(restoration.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Restoration".to_string(),
            id: restoration.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE restorations SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub fn create_restoration_repository(pool: &DbPool) -> Box<dyn RestorationRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteRestorationRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgRestorationRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct RestorationRow {
    id: String,
    artwork_id: String,
    conservator_id: Option<String>,
    description: String,
    start_date: String,
    end_date: Option<String>,
    cost: f64,
    status: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<RestorationRow> for Restoration {
    type Error = DbError;

    fn try_from(row: RestorationRow) -> Result<Self, Self::Error> {
        Ok(Restoration {
            id: parse_uuid(&row.id)?,
            artwork_id: parse_uuid(&row.artwork_id)?,
            conservator_id: parse_optional_uuid(row.conservator_id)?,
            description: row.description,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_optional_date(row.end_date)?,
            cost: row.cost,
            status: parse_enum(&row.status, "restorations.status", RestorationStatus::from_db_str)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgRestorationRow {
    id: Uuid,
    artwork_id: Uuid,
    conservator_id: Option<Uuid>,
    description: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    cost: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgRestorationRow> for Restoration {
    type Error = DbError;

    fn try_from(row: PgRestorationRow) -> Result<Self, Self::Error> {
        Ok(Restoration {
            id: row.id,
            artwork_id: row.artwork_id,
            conservator_id: row.conservator_id,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            cost: row.cost,
            status: parse_enum(&row.status, "restorations.status", RestorationStatus::from_db_str)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::Artwork;
    use crate::db::{create_artwork_repository, test_pool};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_open_ended_job_round_trips() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_restoration_repository(&pool);

        let artwork = Artwork::new("Altarpiece", "Unknown", "panel", 20000.0);
        artworks.create(&artwork).await.unwrap();

        let mut job = Restoration::new(artwork.id, "Varnish removal", date(2024, 2, 1));
        job.cost = 3500.0;
        repo.create(&job).await.unwrap();

        let fetched = repo.get(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.end_date, None);
        assert_eq!(fetched.cost, 3500.0);

        job.end_date = Some(date(2024, 3, 15));
        job.status = RestorationStatus::Completed;
        let saved = repo.save(&job).await.unwrap();
        assert_eq!(saved.duration_days(), Some(43));
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_restoration_repository(&pool);

        let artwork = Artwork::new("Altarpiece", "Unknown", "panel", 20000.0);
        artworks.create(&artwork).await.unwrap();

        let mut running = Restoration::new(artwork.id, "Relining", date(2024, 1, 5));
        running.status = RestorationStatus::InProgress;
        repo.create(&running).await.unwrap();
        repo.create(&Restoration::new(artwork.id, "Frame repair", date(2024, 6, 1)))
            .await
            .unwrap();

        let filter = RestorationFilter {
            status: Some(RestorationStatus::InProgress),
            ..Default::default()
        };
        let listed = repo.list(&filter, &Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, running.id);
        assert_eq!(repo.count(&RestorationFilter::default()).await.unwrap(), 2);
    }
}
