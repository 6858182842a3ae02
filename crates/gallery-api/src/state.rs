//! Application state shared across handlers.

use gallery_core::db::DbPool;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Operational (OLTP) database.
    pub db: Arc<DbPool>,
    /// Reporting warehouse. May be the same database as `db`.
    pub warehouse: Arc<DbPool>,
}

impl AppState {
    pub fn new(db: DbPool, warehouse: DbPool) -> Self {
        Self {
            db: Arc::new(db),
            warehouse: Arc::new(warehouse),
        }
    }

    /// Serves both schemas from one pool.
    pub fn single(db: DbPool) -> Self {
        Self::new(db.clone(), db)
    }
}
