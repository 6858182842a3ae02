//! Visitor and visit data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership tier held by a visitor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    #[default]
    None,
    Standard,
    Premium,
    Patron,
}

impl MembershipType {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            MembershipType::None => "none",
            MembershipType::Standard => "standard",
            MembershipType::Premium => "premium",
            MembershipType::Patron => "patron",
        }
    }

    /// Parses a membership type from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(MembershipType::None),
            "standard" => Some(MembershipType::Standard),
            "premium" => Some(MembershipType::Premium),
            "patron" => Some(MembershipType::Patron),
            _ => None,
        }
    }

    pub fn is_member(&self) -> bool {
        !matches!(self, MembershipType::None)
    }
}

impl std::fmt::Display for MembershipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipType::None => write!(f, "None"),
            MembershipType::Standard => write!(f, "Standard"),
            MembershipType::Premium => write!(f, "Premium"),
            MembershipType::Patron => write!(f, "Patron"),
        }
    }
}

/// A registered visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visitor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Visitor {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            membership_type: MembershipType::None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single recorded visit, optionally tied to the exhibition that was seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub exhibition_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    pub ticket_price: f64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Visit {
    pub fn new(visitor_id: Uuid, visit_date: NaiveDate, ticket_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            visitor_id,
            exhibition_id: None,
            visit_date,
            ticket_price,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}
