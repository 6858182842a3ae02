//! Loan data models.
//!
//! Loans cover artworks leaving the collection (outgoing) as well as works
//! borrowed from other institutions (incoming). Only approved and active loans
//! reserve an artwork's calendar.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a loan relative to the gallery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanDirection {
    Incoming,
    #[default]
    Outgoing,
}

impl LoanDirection {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            LoanDirection::Incoming => "incoming",
            LoanDirection::Outgoing => "outgoing",
        }
    }

    /// Parses a direction from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(LoanDirection::Incoming),
            "outgoing" => Some(LoanDirection::Outgoing),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoanDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanDirection::Incoming => write!(f, "Incoming"),
            LoanDirection::Outgoing => write!(f, "Outgoing"),
        }
    }
}

/// Workflow status of a loan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Requested,
    Approved,
    Active,
    Returned,
    Cancelled,
}

impl LoanStatus {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            LoanStatus::Requested => "requested",
            LoanStatus::Approved => "approved",
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
            LoanStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(LoanStatus::Requested),
            "approved" => Some(LoanStatus::Approved),
            "active" => Some(LoanStatus::Active),
            "returned" => Some(LoanStatus::Returned),
            "cancelled" => Some(LoanStatus::Cancelled),
            _ => None,
        }
    }

    /// Statuses that hold the artwork for the loan period.
    pub fn reserves_artwork(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Active)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Requested => write!(f, "Requested"),
            LoanStatus::Approved => write!(f, "Approved"),
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Returned => write!(f, "Returned"),
            LoanStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A loan agreement for one artwork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loan {
    pub id: Uuid,
    pub artwork_id: Uuid,
    /// Counterparty museum or collector.
    pub institution: String,
    pub direction: LoanDirection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub loan_fee: f64,
    pub status: LoanStatus,
    pub conditions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn new(
        artwork_id: Uuid,
        institution: impl Into<String>,
        direction: LoanDirection,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            artwork_id,
            institution: institution.into(),
            direction,
            start_date,
            end_date,
            loan_fee: 0.0,
            status: LoanStatus::Requested,
            conditions: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if this loan's period shares at least one day with `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Returns true if this loan blocks another loan for the same artwork in `[start, end]`.
    pub fn conflicts_with(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.status.reserves_artwork() && self.overlaps(start, end)
    }
}
