//! Loan repository.

use super::convert::{date_str, parse_date, parse_enum, parse_optional_timestamp, parse_timestamp, parse_uuid};
use super::pagination::Pagination;
use super::{DbError, DbPool};
use crate::loan::{Loan, LoanDirection, LoanStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    pub artwork_id: Option<Uuid>,
    pub status: Option<LoanStatus>,
    pub direction: Option<LoanDirection>,
}

#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn create(&self, loan: &Loan) -> Result<Loan, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Loan>, DbError>;

    async fn list(&self, filter: &LoanFilter, pagination: &Pagination) -> Result<Vec<Loan>, DbError>;

    async fn count(&self, filter: &LoanFilter) -> Result<u64, DbError>;

    async fn save(&self, loan: &Loan) -> Result<Loan, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;

    /// Approved or active loans of the artwork whose window overlaps
    /// `[start, end]`, optionally ignoring one loan (the one being edited).
    async fn find_conflicting(
        &self,
        artwork_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Loan>, DbError>;

    /// Number of approved or active loans holding the artwork.
    async fn count_reserving_for_artwork(&self, artwork_id: Uuid) -> Result<u64, DbError>;
}

const COLUMNS: &str = "id, artwork_id, institution, direction, start_date, end_date, loan_fee, \
    status, conditions, created_at, updated_at, deleted_at";

/// Statuses that hold the artwork, kept in step with `LoanStatus::reserves_artwork`.
const RESERVING: [LoanStatus; 2] = [LoanStatus::Approved, LoanStatus::Active];

pub struct SqliteLoanRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteLoanRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &LoanFilter) -> (String, Vec<String>) {
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
        if let Some(direction) = filter.direction {
            clause.push_str(" AND direction = ?");
            binds.push(direction.as_db_str().to_string());
        }

        (clause, binds)
    }
}

#[async_trait]
impl LoanRepository for SqliteLoanRepository {
    async fn create(&self, loan: &Loan) -> Result<Loan, DbError> {
        sqlx::query(&format!(
            "INSERT INTO loans ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(loan.id.to_string())
        .bind(loan.artwork_id.to_string())
        .bind(&loan.institution)
        .bind(loan.direction.as_db_str())
        .bind(date_str(loan.start_date))
        .bind(date_str(loan.end_date))
        .bind(loan.loan_fee)
        .bind(loan.status.as_db_str())
        .bind(&loan.conditions)
        .bind(loan.created_at.to_rfc3339())
        .bind(loan.updated_at.to_rfc3339())
        .bind(loan.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(loan.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Loan>, DbError> {
        let row: Option<LoanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM loans WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Loan::try_from).transpose()
    }

    async fn list(&self, filter: &LoanFilter, pagination: &Pagination) -> Result<Vec<Loan>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM loans{} ORDER BY start_date DESC, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, LoanRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    async fn count(&self, filter: &LoanFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM loans{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, loan: &Loan) -> Result<Loan, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE loans SET
                artwork_id = ?, institution = ?, direction = ?, start_date = ?, end_date = ?,
                loan_fee = ?, status = ?, conditions = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(loan.artwork_id.to_string())
        .bind(&loan.institution)
        .bind(loan.direction.as_db_str())
        .bind(date_str(loan.start_date))
        .bind(date_str(loan.end_date))
        .bind(loan.loan_fee)
        .bind(loan.status.as_db_str())
        .bind(&loan.conditions)
        .bind(Utc::now().to_rfc3339())
        .bind(loan.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Loan".to_string(),
                id: loan.id.to_string(),
            });
        }

        self.get(loan.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Loan".to_string(),
            id: loan.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE loans SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_conflicting(
        &self,
        artwork_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Loan>, DbError> {
        let rows: Vec<LoanRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM loans
            WHERE deleted_at IS NULL
              AND artwork_id = ?
              AND status IN (?, ?)
              AND start_date <= ? AND end_date >= ?
              AND (? IS NULL OR id <> ?)
            ORDER BY start_date
            "#,
            COLUMNS
        ))
        .bind(artwork_id.to_string())
        .bind(RESERVING[0].as_db_str())
        .bind(RESERVING[1].as_db_str())
        .bind(date_str(end))
        .bind(date_str(start))
        .bind(exclude.map(|id| id.to_string()))
        .bind(exclude.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    async fn count_reserving_for_artwork(&self, artwork_id: Uuid) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE deleted_at IS NULL AND artwork_id = ? AND status IN (?, ?)",
        )
        .bind(artwork_id.to_string())
        .bind(RESERVING[0].as_db_str())
        .bind(RESERVING[1].as_db_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

pub struct PgLoanRepository {
    pool: sqlx::PgPool,
}

impl PgLoanRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::uuid IS NULL OR artwork_id = $1)
      AND ($2::text IS NULL OR status = $2)
      AND ($3::text IS NULL OR direction = $3)
"#;

#[async_trait]
impl LoanRepository for PgLoanRepository {
    async fn create(&self, loan: &Loan) -> Result<Loan, DbError> {
        sqlx::query(&format!(
            "INSERT INTO loans ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            COLUMNS
        ))
        .bind(loan.id)
        .bind(loan.artwork_id)
        .bind(&loan.institution)
        .bind(loan.direction.as_db_str())
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.loan_fee)
        .bind(loan.status.as_db_str())
        .bind(&loan.conditions)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .bind(loan.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(loan.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Loan>, DbError> {
        let row: Option<PgLoanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM loans WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Loan::try_from).transpose()
    }

    async fn list(&self, filter: &LoanFilter, pagination: &Pagination) -> Result<Vec<Loan>, DbError> {
        let rows: Vec<PgLoanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM loans {} ORDER BY start_date DESC, id LIMIT $4 OFFSET $5",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.artwork_id)
        .bind(filter.status.map(|s| s.as_db_str()))
        .bind(filter.direction.map(|d| d.as_db_str()))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    async fn count(&self, filter: &LoanFilter) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM loans {}", PG_FILTER))
            .bind(filter.artwork_id)
            .bind(filter.status.map(|s| s.as_db_str()))
            .bind(filter.direction.map(|d| d.as_db_str()))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn save(&self, loan: &Loan) -> Result<Loan, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE loans SET
                artwork_id = $2, institution = $3, direction = $4, start_date = $5, end_date = $6,
                loan_fee = $7, status = $8, conditions = $9, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(loan.id)
        .bind(loan.artwork_id)
        .bind(&loan.institution)
        .bind(loan.direction.as_db_str())
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.loan_fee)
        .bind(loan.status.as_db_str())
        .bind(&loan.conditions)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Loan".to_string(),
                id: loan.id.to_string(),
            });
        }

        self.get(loan.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Loan".to_string(),
            id: loan.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE loans SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_conflicting(
        &self,
        artwork_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Loan>, DbError> {
        let rows: Vec<PgLoanRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM loans
            WHERE deleted_at IS NULL
              AND artwork_id = $1
              AND status IN ($2, $3)
              AND start_date <= $4 AND end_date >= $5
              AND ($6::uuid IS NULL OR id <> $6)
            ORDER BY start_date
            "#,
            COLUMNS
        ))
        .bind(artwork_id)
        .bind(RESERVING[0].as_db_str())
        .bind(RESERVING[1].as_db_str())
        .bind(end)
        .bind(start)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Loan::try_from).collect()
    }

    async fn count_reserving_for_artwork(&self, artwork_id: Uuid) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE deleted_at IS NULL AND artwork_id = $1 AND status IN ($2, $3)",
        )
        .bind(artwork_id)
        .bind(RESERVING[0].as_db_str())
        .bind(RESERVING[1].as_db_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

pub fn create_loan_repository(pool: &DbPool) -> Box<dyn LoanRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteLoanRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgLoanRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: String,
    artwork_id: String,
    institution: String,
    direction: String,
    start_date: String,
    end_date: String,
    loan_fee: f64,
    status: String,
    conditions: Option<String>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<LoanRow> for Loan {
    type Error = DbError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        Ok(Loan {
            id: parse_uuid(&row.id)?,
            artwork_id: parse_uuid(&row.artwork_id)?,
            institution: row.institution,
            direction: parse_enum(&row.direction, "loans.direction", LoanDirection::from_db_str)?,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            loan_fee: row.loan_fee,
            status: parse_enum(&row.status, "loans.status", LoanStatus::from_db_str)?,
            conditions: row.conditions,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgLoanRow {
    id: Uuid,
    artwork_id: Uuid,
    institution: String,
    direction: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    loan_fee: f64,
    status: String,
    conditions: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgLoanRow> for Loan {
    type Error = DbError;

    fn try_from(row: PgLoanRow) -> Result<Self, Self::Error> {
        Ok(Loan {
            id: row.id,
            artwork_id: row.artwork_id,
            institution: row.institution,
            direction: parse_enum(&row.direction, "loans.direction", LoanDirection::from_db_str)?,
            start_date: row.start_date,
            end_date: row.end_date,
            loan_fee: row.loan_fee,
            status: parse_enum(&row.status, "loans.status", LoanStatus::from_db_str)?,
            conditions: row.conditions,
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

    #[test]
    fn test_reserving_matches_status_rule() {
        for status in RESERVING {
            assert!(status.reserves_artwork());
        }
    }

    #[tokio::test]
    async fn test_conflicts_only_with_reserving_overlaps() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_loan_repository(&pool);

        let artwork = Artwork::new("Bridge", "Monet", "painting", 900.0);
        artworks.create(&artwork).await.unwrap();

        let mut approved = Loan::new(
            artwork.id,
            "Musee d'Orsay",
            LoanDirection::Outgoing,
            date(2024, 3, 1),
            date(2024, 6, 30),
        );
        approved.status = LoanStatus::Approved;
        repo.create(&approved).await.unwrap();

        let requested = Loan::new(
            artwork.id,
            "Tate",
            LoanDirection::Outgoing,
            date(2024, 7, 1),
            date(2024, 8, 1),
        );
        repo.create(&requested).await.unwrap();

        let hits = repo
            .find_conflicting(artwork.id, date(2024, 6, 30), date(2024, 7, 15), None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, approved.id);

        // Requested loans do not hold the artwork.
        let hits = repo
            .find_conflicting(artwork.id, date(2024, 7, 2), date(2024, 7, 3), None)
            .await
            .unwrap();
        assert!(hits.is_empty());

        let hits = repo
            .find_conflicting(artwork.id, date(2024, 4, 1), date(2024, 4, 2), Some(approved.id))
            .await
            .unwrap();
        assert!(hits.is_empty());

        assert_eq!(repo.count_reserving_for_artwork(artwork.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_end_before_start_is_check_violation() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_loan_repository(&pool);

        let artwork = Artwork::new("Bridge", "Monet", "painting", 900.0);
        artworks.create(&artwork).await.unwrap();

        let backwards = Loan::new(
            artwork.id,
            "Rijksmuseum",
            LoanDirection::Incoming,
            date(2024, 5, 1),
            date(2024, 4, 1),
        );
        let err = repo.create(&backwards).await.unwrap_err();
        assert_eq!(err.ora_code(), Some(2290));
    }

    #[tokio::test]
    async fn test_filter_by_direction() {
        let pool = test_pool().await;
        let artworks = create_artwork_repository(&pool);
        let repo = create_loan_repository(&pool);

        let artwork = Artwork::new("Bridge", "Monet", "painting", 900.0);
        artworks.create(&artwork).await.unwrap();

        repo.create(&Loan::new(
            artwork.id,
            "Prado",
            LoanDirection::Incoming,
            date(2024, 1, 1),
            date(2024, 2, 1),
        ))
        .await
        .unwrap();
        repo.create(&Loan::new(
            artwork.id,
            "Louvre",
            LoanDirection::Outgoing,
            date(2024, 3, 1),
            date(2024, 4, 1),
        ))
        .await
        .unwrap();

        let incoming = LoanFilter {
            direction: Some(LoanDirection::Incoming),
            ..Default::default()
        };
        let listed = repo.list(&incoming, &Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].institution, "Prado");
    }
}
