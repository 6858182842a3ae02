//! Restoration job data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress of a restoration job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestorationStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl RestorationStatus {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RestorationStatus::Scheduled => "scheduled",
            RestorationStatus::InProgress => "in_progress",
            RestorationStatus::Completed => "completed",
            RestorationStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(RestorationStatus::Scheduled),
            "in_progress" => Some(RestorationStatus::InProgress),
            "completed" => Some(RestorationStatus::Completed),
            "cancelled" => Some(RestorationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for RestorationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestorationStatus::Scheduled => write!(f, "Scheduled"),
            RestorationStatus::InProgress => write!(f, "In Progress"),
            RestorationStatus::Completed => write!(f, "Completed"),
            RestorationStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Conservation work on an artwork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restoration {
    pub id: Uuid,
    pub artwork_id: Uuid,
    /// Staff member doing the work.
    pub conservator_id: Option<Uuid>,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub cost: f64,
    pub status: RestorationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Restoration {
    pub fn new(artwork_id: Uuid, description: impl Into<String>, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            artwork_id,
            conservator_id: None,
            description: description.into(),
            start_date,
            end_date: None,
            cost: 0.0,
            status: RestorationStatus::Scheduled,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Length of the job in days, if it has an end date.
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date.map(|end| (end - self.start_date).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_days() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut job = Restoration::new(Uuid::new_v4(), "Varnish removal", start);
        assert_eq!(job.duration_days(), None);

        job.end_date = NaiveDate::from_ymd_opt(2024, 3, 2);
        assert_eq!(job.duration_days(), Some(30));
    }
}
