//! Insurance policy repository.

use super::convert::{date_str, parse_date, parse_enum, parse_optional_timestamp, parse_timestamp, parse_uuid};
use super::pagination::Pagination;
use super::{DbError, DbPool};
use crate::insurance::{Insurance, InsuranceStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InsuranceFilter {
    pub artwork_id: Option<Uuid>,
    pub status: Option<InsuranceStatus>,
    pub provider: Option<String>,
}

#[async_trait]
pub trait InsuranceRepository: Send + Sync {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Insurance>, DbError>;

    async fn list(
        &self,
        filter: &InsuranceFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Insurance>, DbError>;

    async fn count(&self, filter: &InsuranceFilter) -> Result<u64, DbError>;

    async fn save(&self, insurance: &Insurance) -> Result<Insurance, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;
}

const COLUMNS: &str = "id, artwork_id, provider, policy_number, coverage_amount, premium, \
    start_date, end_date, status, created_at, updated_at, deleted_at";

pub struct SqliteInsuranceRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteInsuranceRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &InsuranceFilter) -> (String, Vec<String>) {
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
        if let Some(provider) = &filter.provider {
            clause.push_str(" AND provider = ?");
            binds.push(provider.clone());
        }

        (clause, binds)
    }
}

#[async_trait]
impl InsuranceRepository for SqliteInsuranceRepository {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, DbError> {
        sqlx::query(&format!(
            "INSERT INTO insurances ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(insurance.id.to_string())
        .bind(insurance.artwork_id.to_string())
        .bind(&insurance.provider)
        .bind(&insurance.policy_number)
        .bind(insurance.coverage_amount)
        .bind(insurance.premium)
        .bind(date_str(insurance.start_date))
        .bind(date_str(insurance.end_date))
        .bind(insurance.status.as_db_str())
        .bind(insurance.created_at.to_rfc3339())
        .bind(insurance.updated_at.to_rfc3339())
        .bind(insurance.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(insurance.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Insurance>, DbError> {
        let row: Option<InsuranceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM insurances WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Insurance::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &InsuranceFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Insurance>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM insurances{} ORDER BY end_date DESC, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, InsuranceRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Insurance::try_from).collect()
    }

    async fn count(&self, filter: &InsuranceFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM insurances{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, insurance: &Insurance) -> Result<Insurance, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE insurances SET
                artwork_id = ?, provider = ?, policy_number = ?, coverage_amount = ?, premium = ?,
                start_date = ?, end_date = ?, status = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(insurance.artwork_id.to_string())
        .bind(&insurance.provider)
        .bind(&insurance.policy_number)
        .bind(insurance.coverage_amount)
        .bind(insurance.premium)
        .bind(date_str(insurance.start_date))
        .bind(date_str(insurance.end_date))
        .bind(insurance.status.as_db_str())
        .bind(Utc::now().to_rfc3339())
        .bind(insurance.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Insurance".to_string(),
                id: insurance.id.to_string(),
            });
        }

        self.get(insurance.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Insurance".to_string(),
            id: insurance.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE insurances SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgInsuranceRepository {
    pool: sqlx::PgPool,
}

impl PgInsuranceRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::uuid IS NULL OR artwork_id = $1)
      AND ($2::text IS NULL OR status = $2)
      AND ($3::text IS NULL OR provider = $3)
"#;

#[async_trait]
impl InsuranceRepository for PgInsuranceRepository {
    async fn create(&self, insurance: &Insurance) -> Result<Insurance, DbError> {
        sqlx::query(&format!(
            "INSERT INTO insurances ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            COLUMNS
        ))
        .bind(insurance.id)
        .bind(insurance.artwork_id)
        .bind(&insurance.provider)
        .bind(&insurance.policy_number)
        .bind(insurance.coverage_amount)
        .bind(insurance.premium)
        .bind(insurance.start_date)
        .bind(insurance.end_date)
        .bind(insurance.status.as_db_str())
        .bind(insurance.created_at)
        .bind(insurance.updated_at)
        .bind(insurance.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(insurance.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Insurance>, DbError> {
        let row: Option<PgInsuranceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM insurances WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Insurance::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &InsuranceFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Insurance>, DbError> {
        let rows: Vec<PgInsuranceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM insurances {} ORDER BY end_date DESC, id LIMIT $4 OFFSET $5",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.artwork_id)
        .bind(filter.status.map(|s| s.as_db_str()))
        .bind(filter.provider.as_deref())
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Insurance::try_from).collect()
    }

    async fn count(&self, filter: &InsuranceFilter) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM insurances {}", PG_FILTER))
                .bind(filter.artwork_id)
                .bind(filter.status.map(|s| s.as_db_str()))
                .bind(filter.provider.as_deref())
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn save(&self, insurance: &Insurance) -> Result<Insurance, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE insurances SET
                artwork_id = $2, provider = $3, policy_number = $4, coverage_amount = $5,
                premium = $6, start_date = $7, end_date = $8, status = $9, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(insurance.id)
        .bind(insurance.artwork_id)
        .bind(&insurance.provider)
        .bind(&insurance.policy_number)
        .bind(insurance.coverage_amount)
        .bind(insurance.premium)
        .bind(insurance.start_date)
        .bind(insurance.end_date)
        .bind(insurance.status.as_db_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Insurance".to_string(),
                id: insurance.id.to_string(),
            });
        }

        self.get(insurance.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Insurance".to_string(),
            id: insurance.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE insurances SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub fn create_insurance_repository(pool: &DbPool) -> Box<dyn InsuranceRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteInsuranceRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgInsuranceRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct InsuranceRow {
    id: String,
    artwork_id: String,
    provider: String,
    policy_number: String,
    coverage_amount: f64,
    premium: f64,
    start_date: String,
    end_date: String,
    status: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<InsuranceRow> for Insurance {
    type Error = DbError;

    fn try_from(row: InsuranceRow) -> Result<Self, Self::Error> {
        Ok(Insurance {
            id: parse_uuid(&row.id)?,
            artwork_id: parse_uuid(&row.artwork_id)?,
            provider: row.provider,
            policy_number: row.policy_number,
            coverage_amount: row.coverage_amount,
            premium: row.premium,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            status: parse_enum(&row.status, "insurances.status", InsuranceStatus::from_db_str)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgInsuranceRow {
    id: Uuid,
    artwork_id: Uuid,
    provider: String,
    policy_number: String,
    coverage_amount: f64,
    premium: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgInsuranceRow> for Insurance {
    type Error = DbError;

    fn try_from(row: PgInsuranceRow) -> Result<Self, Self::Error> {
        Ok(Insurance {
            id: row.id,
            artwork_id: row.artwork_id,
            provider: row.provider,
            policy_number: row.policy_number,
            coverage_amount: row.coverage_amount,
            premium: row.premium,
            start_date: row.start_date,
            end_date: row.end_date,
            status: parse_enum(&row.status, "insurances.status", InsuranceStatus::from_db_str)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
