//! Database error types.

use crate::oracle;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query execution error that could not be mapped to an Oracle code.
    #[error("Query error: {0}")]
    Query(String),

    /// Record not found.
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// Driver error normalized to its Oracle error number.
    #[error("{} {message}", oracle::format_ora_code(*code))]
    Oracle { code: u32, message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Pool exhausted.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Invalid configuration.
    #[error("Invalid database configuration: {0}")]
    Configuration(String),
}

impl DbError {
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        DbError::Oracle {
            code,
            message: message.into(),
        }
    }

    /// The Oracle error number this failure is reported as, if any.
    pub fn ora_code(&self) -> Option<u32> {
        match self {
            DbError::Oracle { code, .. } => Some(*code),
            DbError::PoolExhausted => Some(18),
            DbError::Connection(_) => Some(12541),
            _ => None,
        }
    }
}

/// Maps a driver-reported database error onto an Oracle error number.
///
/// An explicit `ORA-NNNNN` in the message wins, then the portable error kind,
/// then the backend's SQLSTATE or result code.
#[cfg(feature = "database")]
fn normalize(db_err: &dyn sqlx::error::DatabaseError) -> Option<u32> {
    use sqlx::error::ErrorKind;

    if let Some(code) = oracle::parse_ora_code(db_err.message()) {
        return Some(code);
    }

    match db_err.kind() {
        ErrorKind::UniqueViolation => return Some(1),
        ErrorKind::ForeignKeyViolation => return Some(2291),
        ErrorKind::NotNullViolation => return Some(1400),
        ErrorKind::CheckViolation => return Some(2290),
        _ => {}
    }

    db_err
        .code()
        .and_then(|state| oracle::from_sql_state(state.as_ref()))
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "unknown".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => match normalize(db_err.as_ref()) {
                Some(code) => DbError::Oracle {
                    code,
                    message: db_err.message().to_string(),
                },
                None => DbError::Query(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::Connection("connection pool closed".to_string()),
            sqlx::Error::Io(e) => DbError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => DbError::Connection(e.to_string()),
            sqlx::Error::Configuration(msg) => DbError::Configuration(msg.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Serialization(err.to_string())
            }
            _ => DbError::Query(err.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}
