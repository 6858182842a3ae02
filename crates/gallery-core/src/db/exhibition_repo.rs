//! Exhibition repository, including artwork placements.

use super::convert::{
    date_str, parse_date, parse_enum, parse_optional_timestamp, parse_optional_uuid,
    parse_timestamp, parse_uuid,
};
use super::pagination::Pagination;
use super::{make_like_pattern, DbError, DbPool};
use crate::exhibition::{Exhibition, ExhibitionArtwork, ExhibitionStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Filter criteria for listing exhibitions.
#[derive(Debug, Clone, Default)]
pub struct ExhibitionFilter {
    pub status: Option<ExhibitionStatus>,
    pub curator_id: Option<Uuid>,
    /// Only exhibitions running on this day.
    pub running_on: Option<NaiveDate>,
    /// Partial match on title.
    pub search: Option<String>,
}

/// Repository trait for exhibition persistence.
#[async_trait]
pub trait ExhibitionRepository: Send + Sync {
    async fn create(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<Exhibition>, DbError>;

    async fn list(
        &self,
        filter: &ExhibitionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Exhibition>, DbError>;

    async fn count(&self, filter: &ExhibitionFilter) -> Result<u64, DbError>;

    async fn save(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError>;

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError>;

    /// Places an artwork in the exhibition. A duplicate pair fails with ORA-00001.
    async fn add_artwork(&self, placement: &ExhibitionArtwork) -> Result<ExhibitionArtwork, DbError>;

    async fn remove_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError>;

    /// Placements in display order.
    async fn list_artworks(&self, exhibition_id: Uuid) -> Result<Vec<ExhibitionArtwork>, DbError>;

    async fn has_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError>;
}

const COLUMNS: &str = "id, title, description, start_date, end_date, gallery_room, curator_id, \
    budget, status, created_at, updated_at, deleted_at";

/// SQLite implementation of ExhibitionRepository.
pub struct SqliteExhibitionRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteExhibitionRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &ExhibitionFilter) -> (String, Vec<String>) {
        let mut clause = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();

        if let Some(status) = filter.status {
            clause.push_str(" AND status = ?");
            binds.push(status.as_db_str().to_string());
        }
        if let Some(curator_id) = filter.curator_id {
            clause.push_str(" AND curator_id = ?");
            binds.push(curator_id.to_string());
        }
        if let Some(day) = filter.running_on {
            clause.push_str(" AND start_date <= ? AND end_date >= ?");
            binds.push(date_str(day));
            binds.push(date_str(day));
        }
        if let Some(search) = &filter.search {
            clause.push_str(r" AND title LIKE ? ESCAPE '\'");
            binds.push(make_like_pattern(search));
        }

        (clause, binds)
    }
}

#[async_trait]
impl ExhibitionRepository for SqliteExhibitionRepository {
    async fn create(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError> {
        sqlx::query(&format!(
            "INSERT INTO exhibitions ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(exhibition.id.to_string())
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(date_str(exhibition.start_date))
        .bind(date_str(exhibition.end_date))
        .bind(&exhibition.gallery_room)
        .bind(exhibition.curator_id.map(|id| id.to_string()))
        .bind(exhibition.budget)
        .bind(exhibition.status.as_db_str())
        .bind(exhibition.created_at.to_rfc3339())
        .bind(exhibition.updated_at.to_rfc3339())
        .bind(exhibition.deleted_at.map(|d| d.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(exhibition.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Exhibition>, DbError> {
        let row: Option<ExhibitionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM exhibitions WHERE id = ? AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Exhibition::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ExhibitionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Exhibition>, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!(
            "SELECT {} FROM exhibitions{} ORDER BY start_date DESC, id LIMIT ? OFFSET ?",
            COLUMNS, clause
        );

        let mut query_builder = sqlx::query_as::<_, ExhibitionRow>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Exhibition::try_from).collect()
    }

    async fn count(&self, filter: &ExhibitionFilter) -> Result<u64, DbError> {
        let (clause, binds) = Self::where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM exhibitions{}", clause);

        let mut query_builder = sqlx::query_scalar::<_, i64>(&query);
        for value in binds {
            query_builder = query_builder.bind(value);
        }

        Ok(query_builder.fetch_one(&self.pool).await? as u64)
    }

    async fn save(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE exhibitions SET
                title = ?, description = ?, start_date = ?, end_date = ?, gallery_room = ?,
                curator_id = ?, budget = ?, status = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(date_str(exhibition.start_date))
        .bind(date_str(exhibition.end_date))
        .bind(&exhibition.gallery_room)
        .bind(exhibition.curator_id.map(|id| id.to_string()))
        .bind(exhibition.budget)
        .bind(exhibition.status.as_db_str())
        .bind(Utc::now().to_rfc3339())
        .bind(exhibition.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Exhibition".to_string(),
                id: exhibition.id.to_string(),
            });
        }

        self.get(exhibition.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Exhibition".to_string(),
            id: exhibition.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE exhibitions SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_artwork(&self, placement: &ExhibitionArtwork) -> Result<ExhibitionArtwork, DbError> {
        sqlx::query(
            "INSERT INTO exhibition_artworks (exhibition_id, artwork_id, display_order, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(placement.exhibition_id.to_string())
        .bind(placement.artwork_id.to_string())
        .bind(placement.display_order)
        .bind(placement.added_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(placement.clone())
    }

    async fn remove_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError> {
        let result =
            sqlx::query("DELETE FROM exhibition_artworks WHERE exhibition_id = ? AND artwork_id = ?")
                .bind(exhibition_id.to_string())
                .bind(artwork_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_artworks(&self, exhibition_id: Uuid) -> Result<Vec<ExhibitionArtwork>, DbError> {
        let rows: Vec<PlacementRow> = sqlx::query_as(
            r#"
            SELECT ea.exhibition_id, ea.artwork_id, ea.display_order, ea.added_at
            FROM exhibition_artworks ea
            JOIN artworks a ON a.id = ea.artwork_id
            WHERE ea.exhibition_id = ? AND a.deleted_at IS NULL
            ORDER BY ea.display_order, ea.added_at
            "#,
        )
        .bind(exhibition_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExhibitionArtwork::try_from).collect()
    }

    async fn has_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM exhibition_artworks WHERE exhibition_id = ? AND artwork_id = ?",
        )
        .bind(exhibition_id.to_string())
        .bind(artwork_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

/// PostgreSQL implementation of ExhibitionRepository.
pub struct PgExhibitionRepository {
    pool: sqlx::PgPool,
}

impl PgExhibitionRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const PG_FILTER: &str = r#"
    WHERE deleted_at IS NULL
      AND ($1::text IS NULL OR status = $1)
      AND ($2::uuid IS NULL OR curator_id = $2)
      AND ($3::date IS NULL OR (start_date <= $3 AND end_date >= $3))
      AND ($4::text IS NULL OR title ILIKE $4 ESCAPE '\')
"#;

#[async_trait]
impl ExhibitionRepository for PgExhibitionRepository {
    async fn create(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError> {
        sqlx::query(&format!(
            "INSERT INTO exhibitions ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            COLUMNS
        ))
        .bind(exhibition.id)
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(exhibition.start_date)
        .bind(exhibition.end_date)
        .bind(&exhibition.gallery_room)
        .bind(exhibition.curator_id)
        .bind(exhibition.budget)
        .bind(exhibition.status.as_db_str())
        .bind(exhibition.created_at)
        .bind(exhibition.updated_at)
        .bind(exhibition.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(exhibition.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Exhibition>, DbError> {
        let row: Option<PgExhibitionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM exhibitions WHERE id = $1 AND deleted_at IS NULL",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Exhibition::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ExhibitionFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Exhibition>, DbError> {
        let rows: Vec<PgExhibitionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM exhibitions {} ORDER BY start_date DESC, id LIMIT $5 OFFSET $6",
            COLUMNS, PG_FILTER
        ))
        .bind(filter.status.map(|s| s.as_db_str()))
        .bind(filter.curator_id)
        .bind(filter.running_on)
        .bind(filter.search.as_deref().map(make_like_pattern))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Exhibition::try_from).collect()
    }

    async fn count(&self, filter: &ExhibitionFilter) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM exhibitions {}", PG_FILTER))
                .bind(filter.status.map(|s| s.as_db_str()))
                .bind(filter.curator_id)
                .bind(filter.running_on)
                .bind(filter.search.as_deref().map(make_like_pattern))
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn save(&self, exhibition: &Exhibition) -> Result<Exhibition, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE exhibitions SET
                title = $2, description = $3, start_date = $4, end_date = $5, gallery_room = $6,
                curator_id = $7, budget = $8, status = $9, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(exhibition.id)
        .bind(&exhibition.title)
        .bind(&exhibition.description)
        .bind(exhibition.start_date)
        .bind(exhibition.end_date)
        .bind(&exhibition.gallery_room)
        .bind(exhibition.curator_id)
        .bind(exhibition.budget)
        .bind(exhibition.status.as_db_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                entity: "Exhibition".to_string(),
                id: exhibition.id.to_string(),
            });
        }

        self.get(exhibition.id).await?.ok_or_else(|| DbError::NotFound {
            entity: "Exhibition".to_string(),
            id: exhibition.id.to_string(),
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE exhibitions SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_artwork(&self, placement: &ExhibitionArtwork) -> Result<ExhibitionArtwork, DbError> {
        sqlx::query(
            "INSERT INTO exhibition_artworks (exhibition_id, artwork_id, display_order, added_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(placement.exhibition_id)
        .bind(placement.artwork_id)
        .bind(placement.display_order)
        .bind(placement.added_at)
        .execute(&self.pool)
        .await?;

        Ok(placement.clone())
    }

    async fn remove_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            "DELETE FROM exhibition_artworks WHERE exhibition_id = $1 AND artwork_id = $2",
        )
        .bind(exhibition_id)
        .bind(artwork_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_artworks(&self, exhibition_id: Uuid) -> Result<Vec<ExhibitionArtwork>, DbError> {
        let rows: Vec<PgPlacementRow> = sqlx::query_as(
            r#"
            SELECT ea.exhibition_id, ea.artwork_id, ea.display_order, ea.added_at
            FROM exhibition_artworks ea
            JOIN artworks a ON a.id = ea.artwork_id
            WHERE ea.exhibition_id = $1 AND a.deleted_at IS NULL
            ORDER BY ea.display_order, ea.added_at
            "#,
        )
        .bind(exhibition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ExhibitionArtwork {
                exhibition_id: r.exhibition_id,
                artwork_id: r.artwork_id,
                display_order: r.display_order,
                added_at: r.added_at,
            })
            .collect())
    }

    async fn has_artwork(&self, exhibition_id: Uuid, artwork_id: Uuid) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM exhibition_artworks WHERE exhibition_id = $1 AND artwork_id = $2)",
        )
        .bind(exhibition_id)
        .bind(artwork_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

/// Factory function to create the appropriate repository based on pool type.
pub fn create_exhibition_repository(pool: &DbPool) -> Box<dyn ExhibitionRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteExhibitionRepository::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgExhibitionRepository::new(pool.clone())),
    }
}

#[derive(sqlx::FromRow)]
struct ExhibitionRow {
    id: String,
    title: String,
    description: Option<String>,
    start_date: String,
    end_date: String,
    gallery_room: Option<String>,
    curator_id: Option<String>,
    budget: Option<f64>,
    status: String,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<ExhibitionRow> for Exhibition {
    type Error = DbError;

    fn try_from(row: ExhibitionRow) -> Result<Self, Self::Error> {
        Ok(Exhibition {
            id: parse_uuid(&row.id)?,
            title: row.title,
            description: row.description,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            gallery_room: row.gallery_room,
            curator_id: parse_optional_uuid(row.curator_id)?,
            budget: row.budget,
            status: parse_enum(&row.status, "exhibitions.status", ExhibitionStatus::from_db_str)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            deleted_at: parse_optional_timestamp(row.deleted_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgExhibitionRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    gallery_room: Option<String>,
    curator_id: Option<Uuid>,
    budget: Option<f64>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PgExhibitionRow> for Exhibition {
    type Error = DbError;

    fn try_from(row: PgExhibitionRow) -> Result<Self, Self::Error> {
        Ok(Exhibition {
            id: row.id,
            title: row.title,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            gallery_room: row.gallery_room,
            curator_id: row.curator_id,
            budget: row.budget,
            status: parse_enum(&row.status, "exhibitions.status", ExhibitionStatus::from_db_str)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PlacementRow {
    exhibition_id: String,
    artwork_id: String,
    display_order: i32,
    added_at: String,
}

impl TryFrom<PlacementRow> for ExhibitionArtwork {
    type Error = DbError;

    fn try_from(row: PlacementRow) -> Result<Self, Self::Error> {
        Ok(ExhibitionArtwork {
            exhibition_id: parse_uuid(&row.exhibition_id)?,
            artwork_id: parse_uuid(&row.artwork_id)?,
            display_order: row.display_order,
            added_at: parse_timestamp(&row.added_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PgPlacementRow {
    exhibition_id: Uuid,
    artwork_id: Uuid,
    display_order: i32,
    added_at: DateTime<Utc>,
}
