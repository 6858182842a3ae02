//! Staff data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job role of a staff member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Curator,
    Conservator,
    Registrar,
    Guide,
    Security,
    Administrator,
}

impl StaffRole {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            StaffRole::Curator => "curator",
            StaffRole::Conservator => "conservator",
            StaffRole::Registrar => "registrar",
            StaffRole::Guide => "guide",
            StaffRole::Security => "security",
            StaffRole::Administrator => "administrator",
        }
    }

    /// Parses a role from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "curator" => Some(StaffRole::Curator),
            "conservator" => Some(StaffRole::Conservator),
            "registrar" => Some(StaffRole::Registrar),
            "guide" => Some(StaffRole::Guide),
            "security" => Some(StaffRole::Security),
            "administrator" => Some(StaffRole::Administrator),
            _ => None,
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffRole::Curator => write!(f, "Curator"),
            StaffRole::Conservator => write!(f, "Conservator"),
            StaffRole::Registrar => write!(f, "Registrar"),
            StaffRole::Guide => write!(f, "Guide"),
            StaffRole::Security => write!(f, "Security"),
            StaffRole::Administrator => write!(f, "Administrator"),
        }
    }
}

/// A gallery employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Staff {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        role: StaffRole,
        hire_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            role,
            department: None,
            hire_date,
            salary: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(StaffRole::from_db_str("conservator"), Some(StaffRole::Conservator));
        assert_eq!(StaffRole::from_db_str("janitor"), None);
        assert_eq!(StaffRole::Registrar.to_string(), "Registrar");
    }
}
