//! Visitor repository and the visit log.

use super::convert::{
    date_str, parse_date, parse_enum, parse_optional_timestamp, parse_optional_uuid,
    parse_timestamp, parse_uuid,
};
use super::pagination::Pagination;
use super::{make_like_pattern, DbError, DbPool};
use crate::visitor::{MembershipType, Visit, Visitor};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Filter criteria for listing visitors.
#[derive(Debug, Clone, Default)]
pub struct VisitorFilter {
    pub membership_type: Option<MembershipType>,
    /// Partial match on first name, last name or email.
    pub search: Option<String>,
}

/// Filter criteria for listing visits.
#[derive(Debug, Clone, Default)]
pub struct VisitFilter {
    pub visitor_id: Option<Uuid>,
    pub exhibition_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[async_trait]
pub trait VisitorRepository: Send + Sync {
    async fn create(&self, visitor: &Visitor) -> Result<Visitor, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Visitor>, DbError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Visitor>, DbError>;

    async fn list(
        &self,
        filter: &VisitorFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visitor>, DbError>;

    async fn count(&self, filter: &VisitorFilter) -> Result<u64, DbError>;

    async fn save(&self, visitor: &Visitor) -> Result<Visitor, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DbError>;

    async fn list_visits(
        &self,
        filter: &VisitFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visit>, DbError>;

    async fn count_visits(&self, filter: &VisitFilter) -> Result<u64, DbError>;
}

const COLUMNS: &str =
    "id, first_name, last_name, email, phone, membership_type, created_at, updated_at, deleted_at";

const VISIT_COLUMNS: &str =
    "id, visitor_id, exhibition_id, visit_date, ticket_price, created_at, deleted_at";

pub struct SqliteVisitorRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteVisitorRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &VisitorFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(membership) = filter.membership_type {
            clause.push_str(" AND membership_type = ?");
            binds.push(membership.as_db_str().to_string());
        }
        if let Some(search) = &filter.search {
            clause.push_str(
                r" AND (first_name LIKE ? ESCAPE '\' OR last_name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\')",
            );
            let pattern = make_like_pattern(search);
            binds.push(pattern.clone());
            binds.push(pattern.clone());
            binds.push(pattern);
        }

        (clause, binds)
    }

    fn visit_where_clause(filter: &VisitFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(visitor_id) = filter.visitor_id {
            clause.push_str(" AND visitor_id = ?");
            binds.push(visitor_id.to_string());
        }
        if let Some(exhibition_id) = filter.exhibition_id {
            clause.push_str(" AND exhibition_id = ?");
            binds.push(exhibition_id.to_string());
        }
        if let Some(from) = filter.from {
            clause.push_str(" AND visit_date >= ?");
            binds.push(date_str(from));
        }
        if let Some(to) = filter.to {
            clause.push_str(" AND visit_date <= ?");
            binds.push(date_str(to));
        }

        (clause, binds)
    }
}

#[async_trait]
impl VisitorRepository for SqliteVisitorRepository {
    async fn create(&self, visitor: &Visitor) -> Result<Visitor, DbError> {
        sqlx::query(&format!(
            "INSERT INTO visitors ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(visitor.id.to_string())
        .bind(&visitor.first_name)
        .bind(&visitor.last_name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(visitor.membership_type.as_db_str())
        .bind(visitor.created_at.to_rfc3339())
        .bind(visitor.updated_at.to_rfc3339())
        .bind(visitor.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(visitor.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Visitor>, DbError> {
        let row: Option<VisitorRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visitors WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Visitor::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Visitor>, DbError> {
        let row: Option<VisitorRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visitors WHERE email = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Visitor::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &VisitorFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visitor>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM visitors{} ORDER BY last_name, first_name, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, VisitorRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Visitor::try_from).collect()
    }

    async fn count(&self, filter: &VisitorFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM visitors{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, visitor: &Visitor) -> Result<Visitor, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                first_name = ?, last_name = ?, email = ?, phone = ?, membership_type = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&visitor.first_name)
        .bind(&visitor.last_name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(visitor.membership_type.as_db_str())
        .bind(Utc::now().to_rfc3339())
        .bind(visitor.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Visitor".to_string(),
                id: visitor.id.to_string(),
            });
        }

        self.get(visitor.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Visitor".to_string(),
            id: visitor.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE visitors SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DbError> {
        sqlx::query(&format!(
            "INSERT INTO visits ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            VISIT_COLUMNS
        ))
        .bind(visit.id.to_string())
        .bind(visit.visitor_id.to_string())
        .bind(visit.exhibition_id.map(|id| id.to_string()))
        .bind(date_str(visit.visit_date))
        .bind(visit.ticket_price)
        .bind(visit.created_at.to_rfc3339())
        .bind(visit.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(visit.clone())
    }

    async fn list_visits(
        &self,
        filter: &VisitFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visit>, DbError> {
        let (clause, binds) = Self::visit_where_clause(filter);
        let query = format!(
            "SELECT {} FROM visits{} ORDER BY visit_date DESC, id LIMIT ? OFFSET ?",
            VISIT_COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, VisitRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Visit::try_from).collect()
    }

    async fn count_visits(&self, filter: &VisitFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::visit_where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM visits{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }
}

pub struct PgVisitorRepository {
    pool: sqlx::PgPool,
}

impl PgVisitorRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::text IS NULL OR membership_type = $1)
      AND ($2::text IS NULL OR first_name ILIKE $2 ESCAPE '\' OR last_name ILIKE $2 ESCAPE '\' OR email ILIKE $2 ESCAPE '\')
"#;

const PG_VISIT_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::uuid IS NULL OR visitor_id = $1)
      AND ($2::uuid IS NULL OR exhibition_id = $2)
      AND ($3::date IS NULL OR visit_date >= $3)
      AND ($4::date IS NULL OR visit_date <= $4)
"#;

#[async_trait]
impl VisitorRepository for PgVisitorRepository {
    async fn create(&self, visitor: &Visitor) -> Result<Visitor, DbError> {
        sqlx::query(&format!(
            "INSERT INTO visitors ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            COLUMNS
        ))
        .bind(visitor.id)
        .bind(&visitor.first_name)
        .bind(&visitor.last_name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(visitor.membership_type.as_db_str())
        .bind(visitor.created_at)
        .bind(visitor.updated_at)
        .bind(visitor.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(visitor.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Visitor>, DbError> {
        let row: Option<PgVisitorRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visitors WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Visitor::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Visitor>, DbError> {
        let row: Option<PgVisitorRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visitors WHERE email = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Visitor::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &VisitorFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visitor>, DbError> {
        let rows: Vec<PgVisitorRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visitors {} ORDER BY last_name, first_name, id LIMIT $3 OFFSET $4",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.membership_type.map(|m| m.as_db_str()))
        .bind(filter.search.as_deref().map(make_like_pattern))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Visitor::try_from).collect()
    }

    async fn count(&self, filter: &VisitorFilter) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM visitors {}", PG_FILTER))
            .bind(filter.membership_type.map(|m| m.as_db_str()))
            .bind(filter.search.as_deref().map(make_like_pattern))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn save(&self, visitor: &Visitor) -> Result<Visitor, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE visitors SET
                first_name = $2, last_name = $3, email = $4, phone = $5, membership_type = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(visitor.id)
        .bind(&visitor.first_name)
        .bind(&visitor.last_name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(visitor.membership_type.as_db_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Visitor".to_string(),
                id: visitor.id.to_string(),
            });
        }

        self.get(visitor.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Visitor".to_string(),
            id: visitor.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE visitors SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DbError> {
        sqlx::query(&format!(
            "INSERT INTO visits ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            VISIT_COLUMNS
        ))
        .bind(visit.id)
        .bind(visit.visitor_id)
        .bind(visit.exhibition_id)
        .bind(visit.visit_date)
        .bind(visit.ticket_price)
        .bind(visit.created_at)
        .bind(visit.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(visit.clone())
    }

    async fn list_visits(
        &self,
        filter: &VisitFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Visit>, DbError> {
        let rows: Vec<PgVisitRow> = sqlx::query_as(&format!(
            "SELECT {} FROM visits {} ORDER BY visit_date DESC, id LIMIT $5 OFFSET $6",
            VISIT_COLUMNS, PG_VISIT_FILTER
        ))
        .bind(filter.visitor_id)
        .bind(filter.exhibition_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }

    async fn count_visits(&self, filter: &VisitFilter) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM visits {}", PG_VISIT_FILTER))
                .bind(filter.visitor_id)
                .bind(filter.exhibition_id)
                .bind(filter.from)
                .bind(filter.to)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }
}

pub fn create_visitor_repository(pool: &DbPool) -> Box<dyn VisitorRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteVisitorRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgVisitorRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct VisitorRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    membership_type: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<VisitorRow> for Visitor {
    type Error = DbError;

    fn try_from(row: VisitorRow) -> Result<Self, Self::Error> {
        Ok(Visitor {
            id: parse_uuid(&row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            membership_type: parse_enum(
                &row.membership_type,
                "visitors.membership_type",
                MembershipType::from_db_str,
            )?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgVisitorRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    membership_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgVisitorRow> for Visitor {
    type Error = DbError;

    fn try_from(row: PgVisitorRow) -> Result<Self, Self::Error> {
        Ok(Visitor {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            membership_type: parse_enum(
                &row.membership_type,
                "visitors.membership_type",
                MembershipType::from_db_str,
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: String,
    visitor_id: String,
    exhibition_id: Option<String>,
    visit_date: String,
    ticket_price: f64,
    created_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<VisitRow> for Visit {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(Visit {
            id: parse_uuid(&row.id)?,
            visitor_id: parse_uuid(&row.visitor_id)?,
            exhibition_id: parse_optional_uuid(row.exhibition_id)?,
            visit_date: parse_date(&row.visit_date)?,
            ticket_price: row.ticket_price,
            created_at: parse_timestamp(&row.created_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgVisitRow {
    id: Uuid,
    visitor_id: Uuid,
    exhibition_id: Option<Uuid>,
    visit_date: NaiveDate,
    ticket_price: f64,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<PgVisitRow> for Visit {
    fn from(row: PgVisitRow) -> Self {
        Visit {
            id: row.id,
            visitor_id: row.visitor_id,
            exhibition_id: row.exhibition_id,
            visit_date: row.visit_date,
            ticket_price: row.ticket_price,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_email_unique_among_live_visitors() {
        let pool = test_pool().await;
        let repo = create_visitor_repository(&pool);

        let first = Visitor::new("Mina", "Holm", "mina@example.org");
        repo.create(&first).await.unwrap();

        let clash = Visitor::new("Other", "Person", "mina@example.org");
        let err = repo.create(&clash).await.unwrap_err();
        assert_eq!(err.ora_code(), Some(1));

        // A deleted visitor frees the address.
        assert!(repo.soft_delete(first.id).await.unwrap());
        repo.create(&clash).await.unwrap();

        let found = repo.get_by_email("mina@example.org").await.unwrap().unwrap();
        assert_eq!(found.id, clash.id);
    }

    #[tokio::test]
    async fn test_search_matches_names_and_email() {
        let pool = test_pool().await;
        let repo = create_visitor_repository(&pool);

        let mut patron = Visitor::new("Lena", "Berg", "lena@museum.test");
        patron.membership_type = MembershipType::Patron;
        repo.create(&patron).await.unwrap();
        repo.create(&Visitor::new("Otto", "Lind", "otto@elsewhere.test"))
            .await
            .unwrap();

        let by_email = VisitorFilter {
            search: Some("museum".into()),
            ..Default::default()
        };
        assert_eq!(repo.count(&by_email).await.unwrap(), 1);

        let members = VisitorFilter {
            membership_type: Some(MembershipType::Patron),
            ..Default::default()
        };
        let listed = repo.list(&members, &Pagination::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].last_name, "Berg");
    }

    #[tokio::test]
    async fn test_visits_filtered_by_visitor_and_range() {
        let pool = test_pool().await;
        let repo = create_visitor_repository(&pool);

        let visitor = Visitor::new("Ida", "Ek", "ida@example.org");
        repo.create(&visitor).await.unwrap();

        repo.create_visit(&Visit::new(visitor.id, date(2023, 6, 1), 12.0))
            .await
            .unwrap();
        repo.create_visit(&Visit::new(visitor.id, date(2024, 2, 1), 15.0))
            .await
            .unwrap();

        let all = VisitFilter {
            visitor_id: Some(visitor.id),
            ..Default::default()
        };
        let visits = repo.list_visits(&all, &Pagination::default()).await.unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].visit_date, date(2024, 2, 1));

        let in_2024 = VisitFilter {
            visitor_id: Some(visitor.id),
            from: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert_eq!(repo.count_visits(&in_2024).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_visit_for_unknown_visitor_is_fk_violation() {
        let pool = test_pool().await;
        let repo = create_visitor_repository(&pool);

        let err = repo
            .create_visit(&Visit::new(Uuid::new_v4(), date(2024, 1, 1), 5.0))
            .await
            .unwrap_err();
        assert_eq!(err.ora_code(), Some(2291));
    }
}
