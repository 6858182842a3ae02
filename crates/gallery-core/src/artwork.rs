//! Artwork data models.
//!
//! An artwork is the central record of the collection. Loans, insurance
//! policies, restorations and exhibition placements all reference it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an artwork currently is, from the collection's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkStatus {
    /// In the collection and free to be scheduled.
    #[default]
    Available,
    /// Hanging in an exhibition.
    OnDisplay,
    /// Lent to another institution.
    OnLoan,
    /// With a conservator.
    InRestoration,
    /// Stored off the floor.
    InStorage,
}

impl ArtworkStatus {
    /// All statuses, in display order.
    pub const ALL: [ArtworkStatus; 5] = [
        ArtworkStatus::Available,
        ArtworkStatus::OnDisplay,
        ArtworkStatus::OnLoan,
        ArtworkStatus::InRestoration,
        ArtworkStatus::InStorage,
    ];

    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ArtworkStatus::Available => "available",
            ArtworkStatus::OnDisplay => "on_display",
            ArtworkStatus::OnLoan => "on_loan",
            ArtworkStatus::InRestoration => "in_restoration",
            ArtworkStatus::InStorage => "in_storage",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ArtworkStatus::Available),
            "on_display" => Some(ArtworkStatus::OnDisplay),
            "on_loan" => Some(ArtworkStatus::OnLoan),
            "in_restoration" => Some(ArtworkStatus::InRestoration),
            "in_storage" => Some(ArtworkStatus::InStorage),
            _ => None,
        }
    }

    /// Whether an outgoing loan may be arranged for an artwork in this state.
    pub fn can_be_loaned(&self) -> bool {
        !matches!(self, ArtworkStatus::InRestoration)
    }
}

impl std::fmt::Display for ArtworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtworkStatus::Available => write!(f, "Available"),
            ArtworkStatus::OnDisplay => write!(f, "On Display"),
            ArtworkStatus::OnLoan => write!(f, "On Loan"),
            ArtworkStatus::InRestoration => write!(f, "In Restoration"),
            ArtworkStatus::InStorage => write!(f, "In Storage"),
        }
    }
}

/// A catalogued work in the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub year_created: Option<i32>,
    pub medium: Option<String>,
    /// Collection category used for valuation breakdowns (painting, sculpture, ...).
    pub category: String,
    pub estimated_value: f64,
    pub acquisition_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: ArtworkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Artwork {
    /// Creates a new available artwork with a fresh id.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        category: impl Into<String>,
        estimated_value: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            artist: artist.into(),
            year_created: None,
            medium: None,
            category: category.into(),
            estimated_value,
            acquisition_date: None,
            location: None,
            description: None,
            status: ArtworkStatus::Available,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_round_trip() {
        for status in ArtworkStatus::ALL {
            assert_eq!(ArtworkStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(ArtworkStatus::from_db_str("lost"), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ArtworkStatus::InRestoration).unwrap();
        assert_eq!(json, "\"in_restoration\"");
    }

    #[test]
    fn test_restoration_blocks_loans() {
        assert!(!ArtworkStatus::InRestoration.can_be_loaned());
        assert!(ArtworkStatus::Available.can_be_loaned());
        assert!(ArtworkStatus::OnDisplay.can_be_loaned());
    }

    #[test]
    fn test_new_artwork_defaults() {
        let artwork = Artwork::new("Water Lilies", "Claude Monet", "painting", 1_500_000.0);
        assert_eq!(artwork.status, ArtworkStatus::Available);
        assert!(!artwork.is_deleted());
        assert_eq!(artwork.created_at, artwork.updated_at);
    }
}
