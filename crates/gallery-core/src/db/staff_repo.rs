//! Staff repository.

use super::convert::{
    date_str, parse_date, parse_enum, parse_optional_timestamp, parse_timestamp, parse_uuid,
};
use super::pagination::Pagination;
use super::{make_like_pattern, DbError, DbPool};
use crate::staff::{Staff, StaffRole};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    /// Partial match on first name, last name or email.
    pub search: Option<String>,
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create(&self, staff: &Staff) -> Result<Staff, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Staff>, DbError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Staff>, DbError>;

    async fn list(&self, filter: &StaffFilter, pagination: &Pagination)
        -> Result<Vec<Staff>, DbError>;

    async fn count(&self, filter: &StaffFilter) -> Result<u64, DbError>;

    async fn save(&self, staff: &Staff) -> Result<Staff, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;
}

const COLUMNS: &str = "id, first_name, last_name, email, role, department, hire_date, salary, \
    created_at, updated_at, deleted_at";

pub struct SqliteStaffRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteStaffRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &StaffFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(role) = filter.role {
            clause.push_str(" AND role = ?");
            binds.push(role.as_db_str().to_string());
        }
        if let Some(department) = &filter.department {
            clause.push_str(" AND department = ?");
            binds.push(department.clone());
        }
        if let Some(search) = &filter.search {
            clause.push_str(
                r" AND (first_name LIKE ? ESCAPE '\' OR last_name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\')",
            );
            let pattern = make_like_pattern(search);
            binds.extend(std::iter::repeat(pattern).take(3));
        }

        (clause, binds)
    }
}

#[async_trait]
impl StaffRepository for SqliteStaffRepository {
    async fn create(&self, staff: &Staff) -> Result<Staff, DbError> {
        sqlx::query(&format!(
            "INSERT INTO staff ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(staff.id.to_string())
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.email)
        .bind(staff.role.as_db_str())
        .bind(&staff.department)
        .bind(date_str(staff.hire_date))
        .bind(staff.salary)
        .bind(staff.created_at.to_rfc3339())
        .bind(staff.updated_at.to_rfc3339())
        .bind(staff.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(staff.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Staff>, DbError> {
        let row: Option<StaffRow> = sqlx::query_as(&format!(
            "SELECT {} FROM staff WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Staff::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Staff>, DbError> {
        let row: Option<StaffRow> = sqlx::query_as(&format!(
            "SELECT {} FROM staff WHERE email = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Staff::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &StaffFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Staff>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM staff{} ORDER BY last_name, first_name, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, StaffRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Staff::try_from).collect()
    }

    async fn count(&self, filter: &StaffFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM staff{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, staff: &Staff) -> Result<Staff, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE staff SET
                first_name = ?, last_name = ?, email = ?, role = ?, department = ?,
                hire_date = ?, salary = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.email)
        .bind(staff.role.as_db_str())
        .bind(&staff.department)
        .bind(date_str(staff.hire_date))
        .bind(staff.salary)
        .bind(Utc::now().to_rfc3339())
        .bind(staff.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Staff".to_string(),
                id: staff.id.to_string(),
            });
        }

        self.get(staff.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Staff".to_string(),
            id: staff.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE staff SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PgStaffRepository {
    pool: sqlx::PgPool,
}

impl PgStaffRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::text IS NULL OR role = $1)
      AND ($2::text IS NULL OR department = $2)
      AND ($3::text IS NULL OR first_name ILIKE $3 ESCAPE '\' OR last_name ILIKE $3 ESCAPE '\' OR email ILIKE $3 ESCAPE '\')
"#;

#[async_trait]
impl StaffRepository for PgStaffRepository {
    async fn create(&self, staff: &Staff) -> Result<Staff, DbError> {
        sqlx::query(&format!(
            "INSERT INTO staff ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            COLUMNS
        ))
        .bind(staff.id)
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.email)
        .bind(staff.role.as_db_str())
        .bind(&staff.department)
        .bind(staff.hire_date)
        .bind(staff.salary)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .bind(staff.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(staff.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Staff>, DbError> {
        let row: Option<PgStaffRow> = sqlx::query_as(&format!(
            "SELECT {} FROM staff WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Staff::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Staff>, DbError> {
        let row: Option<PgStaffRow> = sqlx::query_as(&format!(
            "SELECT {} FROM staff WHERE email = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Staff::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &StaffFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Staff>, DbError> {
        let rows: Vec<PgStaffRow> = sqlx::query_as(&format!(
            "SELECT {} FROM staff {} ORDER BY last_name, first_name, id LIMIT $4 OFFSET $5",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.role.map(|r| r.as_db_str()))
        .bind(filter.department.as_deref())
        .bind(filter.search.as_deref().map(make_like_pattern))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Staff::try_from).collect()
    }

    async fn count(&self, filter: &StaffFilter) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM staff {}", PG_FILTER))
            .bind(filter.role.map(|r| r.as_db_str()))
            .bind(filter.department.as_deref())
            .bind(filter.search.as_deref().map(make_like_pattern))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn save(&self, staff: &Staff) -> Result<Staff, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE staff SET
                first_name = $2, last_name = $3, email = $4, role = $5, department = $6,
                hire_date = $7, salary = $8, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(staff.id)
        .bind(&staff.first_name)
        .bind(&staff.last_name)
        .bind(&staff.email)
        .bind(staff.role.as_db_str())
        .bind(&staff.department)
        .bind(staff.hire_date)
        .bind(staff.salary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Staff".to_string(),
                id: staff.id.to_string(),
            });
        }

        self.get(staff.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Staff".to_string(),
            id: staff.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE staff SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub fn create_staff_repository(pool: &DbPool) -> Box<dyn StaffRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteStaffRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgStaffRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    department: Option<String>,
    hire_date: String,
    salary: Option<f64>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<StaffRow> for Staff {
    type Error = DbError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Staff {
            id: parse_uuid(&row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: parse_enum(&row.role, "staff.role", StaffRole::from_db_str)?,
            department: row.department,
            hire_date: parse_date(&row.hire_date)?,
            salary: row.salary,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgStaffRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    department: Option<String>,
    hire_date: NaiveDate,
    salary: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgStaffRow> for Staff {
    type Error = DbError;

    fn try_from(row: PgStaffRow) -> Result<Self, Self::Error> {
        Ok(Staff {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: parse_enum(&row.role, "staff.role", StaffRole::from_db_str)?,
            department: row.department,
            hire_date: row.hire_date,
            salary: row.salary,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
