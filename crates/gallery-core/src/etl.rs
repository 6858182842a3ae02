//! Warehouse sync audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sync type recorded for a full warehouse rebuild.
pub const FULL_REFRESH: &str = "full_refresh";

/// Outcome of a warehouse sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EtlSyncStatus {
    Running,
    Succeeded,
    Failed,
}

impl EtlSyncStatus {
    /// Returns the database-compatible string representation (snake_case).
    pub fn as_db_str(&self) -> &'static str {
        match self {
            EtlSyncStatus::Running => "running",
            EtlSyncStatus::Succeeded => "succeeded",
            EtlSyncStatus::Failed => "failed",
        }
    }

    /// Parses a status from a database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "running" => Some(EtlSyncStatus::Running),
            "succeeded" => Some(EtlSyncStatus::Succeeded),
            "failed" => Some(EtlSyncStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for EtlSyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EtlSyncStatus::Running => write!(f, "Running"),
            EtlSyncStatus::Succeeded => write!(f, "Succeeded"),
            EtlSyncStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Audit row for one warehouse refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtlSync {
    pub id: Uuid,
    pub sync_type: String,
    pub status: EtlSyncStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rows_processed: i64,
    pub error_message: Option<String>,
}

impl EtlSync {
    /// Starts a new sync record in the running state.
    pub fn start(sync_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sync_type: sync_type.into(),
            status: EtlSyncStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            rows_processed: 0,
            error_message: None,
        }
    }

    pub fn succeed(&mut self, rows_processed: i64) {
        self.status = EtlSyncStatus::Succeeded;
        self.rows_processed = rows_processed;
        self.finished_at = Some(Utc::now());
        self.error_message = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = EtlSyncStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error_message = Some(error.into());
    }

    /// Wall-clock duration in milliseconds, once finished.
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_lifecycle() {
        let mut sync = EtlSync::start(FULL_REFRESH);
        assert_eq!(sync.status, EtlSyncStatus::Running);
        assert!(sync.duration_ms().is_none());

        sync.succeed(42);
        assert_eq!(sync.status, EtlSyncStatus::Succeeded);
        assert_eq!(sync.rows_processed, 42);
        assert!(sync.duration_ms().unwrap() >= 0);
    }

    #[test]
    fn test_sync_failure_keeps_message() {
        let mut sync = EtlSync::start(FULL_REFRESH);
        sync.fail("ORA-03113: end-of-file on communication channel");
        assert_eq!(sync.status, EtlSyncStatus::Failed);
        assert!(sync.error_message.unwrap().contains("ORA-03113"));
    }
}
