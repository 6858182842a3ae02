//! Artwork repository for database operations.

use super::convert::{
    date_str, parse_enum, parse_optional_date, parse_optional_timestamp, parse_timestamp,
    parse_uuid,
};
use super::pagination::Pagination;
use super::{make_like_pattern, DbError, DbPool};
use crate::artwork::{Artwork, ArtworkStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Filter criteria for listing artworks.
#[derive(Debug, Clone, Default)]
pub struct ArtworkFilter {
    pub status: Option<ArtworkStatus>,
    pub category: Option<String>,
    pub artist: Option<String>,
    /// Case-insensitive match on title or artist.
    pub search: Option<String>,
}

/// Repository trait for artwork persistence.
///
/// Soft-deleted artworks are invisible to every read.
#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    async fn create(&self, artwork: &Artwork) -> Result<Artwork, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, DbError>;

    async fn list(
        &self,
        filter: &ArtworkFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Artwork>, DbError>;

    async fn count(&self, filter: &ArtworkFilter) -> Result<u64, DbError>;

    /// Writes every mutable column of `artwork` and bumps `updated_at`.
    async fn save(&self, artwork: &Artwork) -> Result<Artwork, DbError>;

    /// Marks the artwork deleted. Returns false if it did not exist.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;
}

const COLUMNS: &str = "id, title, artist, year_created, medium, category, estimated_value, \
    acquisition_date, location, description, status, created_at, updated_at, deleted_at";

/// SQLite implementation of ArtworkRepository.
pub struct SqliteArtworkRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteArtworkRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &ArtworkFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(status) = filter.status {
            clause.push_str(" AND status = ?");
            binds.push(status.as_db_str().to_string());
        }
        if let Some(category) = &filter.category {
            clause.push_str(" AND category = ?");
            binds.push(category.clone());
        }
        if let Some(artist) = &filter.artist {
            clause.push_str(" AND artist = ?");
            binds.push(artist.clone());
        }
        if let Some(search) = &filter.search {
            clause.push_str(r" AND (title LIKE ? ESCAPE '\' OR artist LIKE ? ESCAPE '\')");
            let pattern = make_like_pattern(search);
            binds.push(pattern.clone());
            binds.push(pattern);
        }

        (clause, binds)
    }
}

#[async_trait]
impl ArtworkRepository for SqliteArtworkRepository {
    async fn create(&self, artwork: &Artwork) -> Result<Artwork, DbError> {
        sqlx::query(&format!(
            "INSERT INTO artworks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(artwork.id.to_string())
        .bind(&artwork.title)
        .bind(&artwork.artist)
        .bind(artwork.year_created)
        .bind(&artwork.medium)
        .bind(&artwork.category)
        .bind(artwork.estimated_value)
        .bind(artwork.acquisition_date.map(date_str))
        .bind(&artwork.location)
        .bind(&artwork.description)
        .bind(artwork.status.as_db_str())
        .bind(artwork.created_at.to_rfc3339())
        .bind(artwork.updated_at.to_rfc3339())
        .bind(artwork.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(artwork.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, DbError> {
        let row: Option<ArtworkRow> = sqlx::query_as(&format!(
            "SELECT {} FROM artworks WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Artwork::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ArtworkFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Artwork>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM artworks{} ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, ArtworkRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Artwork::try_from).collect()
    }

    async fn count(&self, filter: &ArtworkFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM artworks{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let count = query_builder.fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn save(&self, artwork: &Artwork) -> Result<Artwork, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE artworks SET
                title = ?, artist = ?, year_created = ?, medium = ?, category = ?,
                estimated_value = ?, acquisition_date = ?, location = ?, description = ?,
                status = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&artwork.title)
        .bind(&artwork.artist)
        .bind(artwork.year_created)
        .bind(&artwork.medium)
        .bind(&artwork.category)
        .bind(artwork.estimated_value)
        .bind(artwork.acquisition_date.map(date_str))
        .bind(&artwork.location)
        .bind(&artwork.description)
        .bind(artwork.status.as_db_str())
        .bind(Utc::now().to_rfc3339())
        .bind(artwork.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Artwork".to_string(),
                id: artwork.id.to_string(),
            });
        }

        self.get(artwork.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Artwork".to_string(),
            id: artwork.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE artworks SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// PostgreSQL implementation of ArtworkRepository.
pub struct PgArtworkRepository {
    pool: sqlx::PgPool,
}

impl PgArtworkRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR category = $2)
      AND ($3::text IS NULL OR artist = $3)
      AND ($4::text IS NULL OR title ILIKE $4 ESCAPE '\' OR artist ILIKE $4 ESCAPE '\')
"#;

#[async_trait]
impl ArtworkRepository for PgArtworkRepository {
    async fn create(&self, artwork: &Artwork) -> Result<Artwork, DbError> {
        sqlx::query(&format!(
            "INSERT INTO artworks ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            COLUMNS
        ))
        .bind(artwork.id)
        .bind(&artwork.title)
        .bind(&artwork.artist)
        .bind(artwork.year_created)
        .bind(&artwork.medium)
        .bind(&artwork.category)
        .bind(artwork.estimated_value)
        .bind(artwork.acquisition_date)
        .bind(&artwork.location)
        .bind(&artwork.description)
        .bind(artwork.status.as_db_str())
        .bind(artwork.created_at)
        .bind(artwork.updated_at)
        .bind(artwork.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(artwork.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Artwork>, DbError> {
        let row: Option<PgArtworkRow> = sqlx::query_as(&format!(
            "SELECT {} FROM artworks WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Artwork::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ArtworkFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Artwork>, DbError> {
        let rows: Vec<PgArtworkRow> = sqlx::query_as(&format!(
            "SELECT {} FROM artworks {} ORDER BY created_at DESC, id LIMIT $5 OFFSET $6",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.status.map(|s| s.as_db_str()))
        .bind(&filter.category)
        .bind(&filter.artist)
        .bind(filter.search.as_deref().map(make_like_pattern))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Artwork::try_from).collect()
    }

    async fn count(&self, filter: &ArtworkFilter) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM artworks {}", PG_FILTER))
            .bind(filter.status.map(|s| s.as_db_str()))
            .bind(&filter.category)
            .bind(&filter.artist)
            .bind(filter.search.as_deref().map(make_like_pattern))
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn save(&self, artwork: &Artwork) -> Result<Artwork, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE artworks SET
                title = $2, artist = $3, year_created = $4, medium = $5, category = $6,
                estimated_value = $7, acquisition_date = $8, location = $9, description = $10,
                status = $11, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(artwork.id)
        .bind(&artwork.title)
        .bind(&artwork.artist)
        .bind(artwork.year_created)
        .bind(&artwork.medium)
        .bind(&artwork.category)
        .bind(artwork.estimated_value)
        .bind(artwork.acquisition_date)
        .bind(&artwork.location)
        .bind(&artwork.description)
        .bind(artwork.status.as_db_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Artwork".to_string(),
                id: artwork.id.to_string(),
            });
        }

        self.get(artwork.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Artwork".to_string(),
            id: artwork.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE artworks SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Factory function to create the appropriate repository based on pool type.
pub fn create_artwork_repository(pool: &DbPool) -> Box<dyn ArtworkRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteArtworkRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgArtworkRepository::new(pool.clone())),
    }
}

// Helper structs for SQLx row mapping

#[derive(sqlx::FromRow)]
struct ArtworkRow {
    id: String,
    title: String,
    artist: String,
    year_created: Option<i32>,
    medium: Option<String>,
    category: String,
    estimated_value: f64,
    acquisition_date: Option<String>,
    location: Option<String>,
    description: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<ArtworkRow> for Artwork {
    type Error = DbError;

    fn try_from(row: ArtworkRow) -> Result<Self, Self::Error> {
        Ok(Artwork {
            id: parse_uuid(&row.id)?,
            title: row.title,
            artist: row.artist,
            year_created: row.year_created,
            medium: row.medium,
            category: row.category,
            estimated_value: row.estimated_value,
            acquisition_date: parse_optional_date(row.acquisition_date)?,
            location: row.location,
            description: row.description,
            status: parse_enum(&row.status, "artworks.status", ArtworkStatus::from_db_str)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgArtworkRow {
    id: Uuid,
    title: String,
    artist: String,
    year_created: Option<i32>,
    medium: Option<String>,
    category: String,
    estimated_value: f64,
    acquisition_date: Option<NaiveDate>,
    location: Option<String>,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgArtworkRow> for Artwork {
    type Error = DbError;

    fn try_from(row: PgArtworkRow) -> Result<Self, Self::Error> {
        Ok(Artwork {
            id: row.id,
            title: row.title,
            artist: row.artist,
            year_created: row.year_created,
            medium: row.medium,
            category: row.category,
            estimated_value: row.estimated_value,
            acquisition_date: row.acquisition_date,
            location: row.location,
            description: row.description,
            status: parse_enum(&row.status, "artworks.status", ArtworkStatus::from_db_str)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
