//! Insurance policy data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of an insurance policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

impl InsuranceStatus {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            InsuranceStatus::Active => "active",
            InsuranceStatus::Expired => "expired",
            InsuranceStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(InsuranceStatus::Active),
            "expired" => Some(InsuranceStatus::Expired),
            "cancelled" => Some(InsuranceStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for InsuranceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsuranceStatus::Active => write!(f, "Active"),
            InsuranceStatus::Expired => write!(f, "Expired"),
            InsuranceStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// An insurance policy covering a single artwork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insurance {
    pub id: Uuid,
    pub artwork_id: Uuid,
    pub provider: String,
    /// Unique across all policies.
    pub policy_number: String,
    pub coverage_amount: f64,
    pub premium: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: InsuranceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Insurance {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        artwork_id: Uuid,
        provider: impl Into<String>,
        policy_number: impl Into<String>,
        coverage_amount: f64,
        premium: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            artwork_id,
            provider: provider.into(),
            policy_number: policy_number.into(),
            coverage_amount,
            premium,
            start_date,
            end_date,
            status: InsuranceStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the policy is active and `day` is inside its term.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.status == InsuranceStatus::Active && self.start_date <= day && day <= self.end_date
    }
}
