//! Star-schema loading and the aggregate queries behind the reports.

use super::convert::{date_str, parse_uuid};
use super::{DbError, DbPool};
use crate::reports::{
    CategoryAggregate, ExhibitionAggregate, ProviderAggregate, StatusAggregate, YearAggregate,
};
use crate::warehouse::WarehouseSnapshot;
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    /// Replaces every dimension and fact row with `snapshot` in one
    /// transaction. Returns the number of rows written.
    async fn replace_snapshot(&self, snapshot: &WarehouseSnapshot) -> Result<u64, DbError>;

    async fn category_values(&self) -> Result<Vec<CategoryAggregate>, DbError>;

    async fn visits_by_year(&self) -> Result<Vec<YearAggregate>, DbError>;

    async fn exhibition_performance(&self) -> Result<Vec<ExhibitionAggregate>, DbError>;

    async fn loans_by_status(&self) -> Result<Vec<StatusAggregate>, DbError>;

    async fn restorations_by_year(&self) -> Result<Vec<YearAggregate>, DbError>;

    /// Active policies only.
    async fn insurance_by_provider(&self) -> Result<Vec<ProviderAggregate>, DbError>;
}

const CLEAR_TABLES: [&str; 7] = [
    "DELETE FROM fact_visits",
    "DELETE FROM fact_loans",
    "DELETE FROM fact_restorations",
    "DELETE FROM fact_insurance",
    "DELETE FROM dim_artwork",
    "DELETE FROM dim_exhibition",
    "DELETE FROM dim_date",
];

const CATEGORY_VALUES: &str = "SELECT category, COUNT(*), COALESCE(SUM(estimated_value), 0.0) \
    FROM dim_artwork GROUP BY category";
const LOANS_BY_STATUS: &str =
    "SELECT status, COUNT(*), COALESCE(SUM(loan_fee), 0.0) FROM fact_loans GROUP BY status";
const INSURANCE_BY_PROVIDER: &str = "SELECT provider, COUNT(*), \
    COALESCE(SUM(coverage_amount), 0.0), COALESCE(SUM(premium), 0.0) \
    FROM fact_insurance WHERE status = 'active' GROUP BY provider";

pub struct SqliteWarehouseRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteWarehouseRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    async fn by_year(&self, query: &str) -> Result<Vec<YearAggregate>, DbError> {
        let rows: Vec<(i64, i64, f64)> = sqlx::query_as(query).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(year, count, amount)| YearAggregate {
                year: year as i32,
                count,
                amount,
            })
            .collect())
    }
}

#[async_trait]
impl WarehouseRepository for SqliteWarehouseRepository {
    async fn replace_snapshot(&self, snapshot: &WarehouseSnapshot) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        for statement in CLEAR_TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        for dim in &snapshot.dates {
            sqlx::query(
                r#"
                INSERT INTO dim_date
                    (date_key, full_date, year, quarter, month, day, day_of_week, month_name, is_weekend)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(dim.date_key)
            .bind(date_str(dim.full_date))
            .bind(dim.year)
            .bind(dim.quarter)
            .bind(dim.month)
            .bind(dim.day)
            .bind(dim.day_of_week)
            .bind(&dim.month_name)
            .bind(dim.is_weekend)
            .execute(&mut *tx)
            .await?;
        }

        for dim in &snapshot.artworks {
            sqlx::query(
                r#"
                INSERT INTO dim_artwork
                    (artwork_key, artwork_id, title, artist, category, status, estimated_value)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(dim.artwork_key)
            .bind(dim.artwork_id.to_string())
            .bind(&dim.title)
            .bind(&dim.artist)
            .bind(&dim.category)
            .bind(&dim.status)
            .bind(dim.estimated_value)
            .execute(&mut *tx)
            .await?;
        }

        for dim in &snapshot.exhibitions {
            sqlx::query(
                r#"
                INSERT INTO dim_exhibition
                    (exhibition_key, exhibition_id, title, start_date, end_date, status)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(dim.exhibition_key)
            .bind(dim.exhibition_id.to_string())
            .bind(&dim.title)
            .bind(date_str(dim.start_date))
            .bind(date_str(dim.end_date))
            .bind(&dim.status)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.visits {
            sqlx::query(
                "INSERT INTO fact_visits (visit_id, date_key, exhibition_key, ticket_price) VALUES (?, ?, ?, ?)",
            )
            .bind(fact.visit_id.to_string())
            .bind(fact.date_key)
            .bind(fact.exhibition_key)
            .bind(fact.ticket_price)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.loans {
            sqlx::query(
                r#"
                INSERT INTO fact_loans (loan_id, artwork_key, start_date_key, status, direction, loan_fee)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(fact.loan_id.to_string())
            .bind(fact.artwork_key)
            .bind(fact.start_date_key)
            .bind(&fact.status)
            .bind(&fact.direction)
            .bind(fact.loan_fee)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.restorations {
            sqlx::query(
                r#"
                INSERT INTO fact_restorations (restoration_id, artwork_key, start_date_key, cost, status)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(fact.restoration_id.to_string())
            .bind(fact.artwork_key)
            .bind(fact.start_date_key)
            .bind(fact.cost)
            .bind(&fact.status)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.insurances {
            sqlx::query(
                r#"
                INSERT INTO fact_insurance
                    (insurance_id, artwork_key, provider, coverage_amount, premium, status)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(fact.insurance_id.to_string())
            .bind(fact.artwork_key)
            .bind(&fact.provider)
            .bind(fact.coverage_amount)
            .bind(fact.premium)
            .bind(&fact.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let rows = snapshot.row_count() as u64;
        debug!(rows, "Warehouse snapshot replaced");
        Ok(rows)
    }

    async fn category_values(&self) -> Result<Vec<CategoryAggregate>, DbError> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(CATEGORY_VALUES)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(category, artwork_count, total_value)| CategoryAggregate {
                category,
                artwork_count,
                total_value,
            })
            .collect())
    }

    async fn visits_by_year(&self) -> Result<Vec<YearAggregate>, DbError> {
        self.by_year(
            "SELECT date_key / 10000 AS year, COUNT(*), COALESCE(SUM(ticket_price), 0.0) \
             FROM fact_visits GROUP BY date_key / 10000",
        )
        .await
    }

    async fn exhibition_performance(&self) -> Result<Vec<ExhibitionAggregate>, DbError> {
        let rows: Vec<(String, String, i64, f64)> = sqlx::query_as(
            r#"
            SELECT e.exhibition_id, e.title, COUNT(v.visit_id), COALESCE(SUM(v.ticket_price), 0.0)
            FROM dim_exhibition e
            LEFT JOIN fact_visits v ON v.exhibition_key = e.exhibition_key
            GROUP BY e.exhibition_key, e.exhibition_id, e.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, title, visit_count, revenue)| {
                Ok(ExhibitionAggregate {
                    exhibition_id: parse_uuid(&id)?,
                    title,
                    visit_count,
                    revenue,
                })
            })
            .collect()
    }

    async fn loans_by_status(&self) -> Result<Vec<StatusAggregate>, DbError> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(LOANS_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(status_aggregate).collect())
    }

    async fn restorations_by_year(&self) -> Result<Vec<YearAggregate>, DbError> {
        self.by_year(
            "SELECT start_date_key / 10000 AS year, COUNT(*), COALESCE(SUM(cost), 0.0) \
             FROM fact_restorations GROUP BY start_date_key / 10000",
        )
        .await
    }

    async fn insurance_by_provider(&self) -> Result<Vec<ProviderAggregate>, DbError> {
        let rows: Vec<(String, i64, f64, f64)> = sqlx::query_as(INSURANCE_BY_PROVIDER)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(provider_aggregate).collect())
    }
}

pub struct PgWarehouseRepository {
    pool: sqlx::PgPool,
}

impl PgWarehouseRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn by_year(&self, query: &str) -> Result<Vec<YearAggregate>, DbError> {
        let rows: Vec<(i32, i64, f64)> = sqlx::query_as(query).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(year, count, amount)| YearAggregate {
                year,
                count,
                amount,
            })
            .collect())
    }
}

#[async_trait]
impl WarehouseRepository for PgWarehouseRepository {
    async fn replace_snapshot(&self, snapshot: &WarehouseSnapshot) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        for statement in CLEAR_TABLES {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        for dim in &snapshot.dates {
            sqlx::query(
                r#"
                INSERT INTO dim_date
                    (date_key, full_date, year, quarter, month, day, day_of_week, month_name, is_weekend)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(dim.date_key)
            .bind(dim.full_date)
            .bind(dim.year)
            .bind(dim.quarter)
            .bind(dim.month)
            .bind(dim.day)
            .bind(dim.day_of_week)
            .bind(&dim.month_name)
            .bind(dim.is_weekend)
            .execute(&mut *tx)
            .await?;
        }

        for dim in &snapshot.artworks {
            sqlx::query(
                r#"
                INSERT INTO dim_artwork
                    (artwork_key, artwork_id, title, artist, category, status, estimated_value)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(dim.artwork_key)
            .bind(dim.artwork_id)
            .bind(&dim.title)
            .bind(&dim.artist)
            .bind(&dim.category)
            .bind(&dim.status)
            .bind(dim.estimated_value)
            .execute(&mut *tx)
            .await?;
        }

        for dim in &snapshot.exhibitions {
            sqlx::query(
                r#"
                INSERT INTO dim_exhibition
                    (exhibition_key, exhibition_id, title, start_date, end_date, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(dim.exhibition_key)
            .bind(dim.exhibition_id)
            .bind(&dim.title)
            .bind(dim.start_date)
            .bind(dim.end_date)
            .bind(&dim.status)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.visits {
            sqlx::query(
                "INSERT INTO fact_visits (visit_id, date_key, exhibition_key, ticket_price) VALUES ($1, $2, $3, $4)",
            )
            .bind(fact.visit_id)
            .bind(fact.date_key)
            .bind(fact.exhibition_key)
            .bind(fact.ticket_price)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.loans {
            sqlx::query(
                r#"
                INSERT INTO fact_loans (loan_id, artwork_key, start_date_key, status, direction, loan_fee)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(fact.loan_id)
            .bind(fact.artwork_key)
            .bind(fact.start_date_key)
            .bind(&fact.status)
            .bind(&fact.direction)
            .bind(fact.loan_fee)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.restorations {
            sqlx::query(
                r#"
                INSERT INTO fact_restorations (restoration_id, artwork_key, start_date_key, cost, status)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(fact.restoration_id)
            .bind(fact.artwork_key)
            .bind(fact.start_date_key)
            .bind(fact.cost)
            .bind(&fact.status)
            .execute(&mut *tx)
            .await?;
        }

        for fact in &snapshot.insurances {
            sqlx::query(
                r#"
                INSERT INTO fact_insurance
                    (insurance_id, artwork_key, provider, coverage_amount, premium, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(fact.insurance_id)
            .bind(fact.artwork_key)
            .bind(&fact.provider)
            .bind(fact.coverage_amount)
            .bind(fact.premium)
            .bind(&fact.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let rows = snapshot.row_count() as u64;
        debug!(rows, "Warehouse snapshot replaced");
        Ok(rows)
    }

    async fn category_values(&self) -> Result<Vec<CategoryAggregate>, DbError> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(CATEGORY_VALUES)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(category, artwork_count, total_value)| CategoryAggregate {
                category,
                artwork_count,
                total_value,
            })
            .collect())
    }

    async fn visits_by_year(&self) -> Result<Vec<YearAggregate>, DbError> {
        self.by_year(
            "SELECT date_key / 10000 AS year, COUNT(*), COALESCE(SUM(ticket_price), 0.0) \
             FROM fact_visits GROUP BY date_key / 10000",
        )
        .await
    }

    async fn exhibition_performance(&self) -> Result<Vec<ExhibitionAggregate>, DbError> {
        let rows: Vec<(Uuid, String, i64, f64)> = sqlx::query_as(
            r#"
            SELECT e.exhibition_id, e.title, COUNT(v.visit_id), COALESCE(SUM(v.ticket_price), 0.0)
            FROM dim_exhibition e
            LEFT JOIN fact_visits v ON v.exhibition_key = e.exhibition_key
            GROUP BY e.exhibition_key, e.exhibition_id, e.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(exhibition_id, title, visit_count, revenue)| ExhibitionAggregate {
                exhibition_id,
                title,
                visit_count,
                revenue,
            })
            .collect())
    }

    async fn loans_by_status(&self) -> Result<Vec<StatusAggregate>, DbError> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(LOANS_BY_STATUS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(status_aggregate).collect())
    }

    async fn restorations_by_year(&self) -> Result<Vec<YearAggregate>, DbError> {
        self.by_year(
            "SELECT start_date_key / 10000 AS year, COUNT(*), COALESCE(SUM(cost), 0.0) \
             FROM fact_restorations GROUP BY start_date_key / 10000",
        )
        .await
    }

    async fn insurance_by_provider(&self) -> Result<Vec<ProviderAggregate>, DbError> {
        let rows: Vec<(String, i64, f64, f64)> = sqlx::query_as(INSURANCE_BY_PROVIDER)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(provider_aggregate).collect())
    }
}

fn status_aggregate((status, count, amount): (String, i64, f64)) -> StatusAggregate {
    StatusAggregate {
        status,
        count,
        amount,
    }
}

fn provider_aggregate(
    (provider, policy_count, total_coverage, total_premium): (String, i64, f64, f64),
) -> ProviderAggregate {
    ProviderAggregate {
        provider,
        policy_count,
        total_coverage,
        total_premium,
    }
}

pub fn create_warehouse_repository(pool: &DbPool) -> Box<dyn WarehouseRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteWarehouseRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgWarehouseRepository::new(pool.clone())),
    }
}
