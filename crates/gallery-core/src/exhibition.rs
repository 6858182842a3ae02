//! Exhibition data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an exhibition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhibitionStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl ExhibitionStatus {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ExhibitionStatus::Planned => "planned",
            ExhibitionStatus::Active => "active",
            ExhibitionStatus::Completed => "completed",
            ExhibitionStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "planned" => Some(ExhibitionStatus::Planned),
            "active" => Some(ExhibitionStatus::Active),
            "completed" => Some(ExhibitionStatus::Completed),
            "cancelled" => Some(ExhibitionStatus::Cancelled),
            _ => None,
        }
    }

    /// Closed exhibitions no longer accept artworks.
    pub fn accepts_artworks(&self) -> bool {
        matches!(self, ExhibitionStatus::Planned | ExhibitionStatus::Active)
    }
}

impl std::fmt::Display for ExhibitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExhibitionStatus::Planned => write!(f, "Planned"),
            ExhibitionStatus::Active => write!(f, "Active"),
            ExhibitionStatus::Completed => write!(f, "Completed"),
            ExhibitionStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A scheduled show in one of the gallery rooms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exhibition {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gallery_room: Option<String>,
    /// Staff member curating the show.
    pub curator_id: Option<Uuid>,
    pub budget: Option<f64>,
    pub status: ExhibitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Exhibition {
    /// Creates a new planned exhibition.
    pub fn new(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            start_date,
            end_date,
            gallery_room: None,
            curator_id: None,
            budget: None,
            status: ExhibitionStatus::Planned,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the given day falls within the exhibition run.
    pub fn is_running_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Placement of an artwork in an exhibition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExhibitionArtwork {
    pub exhibition_id: Uuid,
    pub artwork_id: Uuid,
    pub display_order: i32,
    pub added_at: DateTime<Utc>,
}

impl ExhibitionArtwork {
    pub fn new(exhibition_id: Uuid, artwork_id: Uuid, display_order: i32) -> Self {
        Self {
            exhibition_id,
            artwork_id,
            display_order,
            added_at: Utc::now(),
        }
    }
}
