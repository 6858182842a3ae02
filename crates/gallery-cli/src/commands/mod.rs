//! CLI command implementations.

mod database;
mod serve;

pub use database::{run_migrate, run_sync, MigrateTarget};
pub use serve::run_server;
