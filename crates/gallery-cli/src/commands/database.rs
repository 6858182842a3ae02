//! Migration and warehouse sync commands.

use anyhow::{Context, Result};
use colored::Colorize;
use gallery_core::db::{
    create_pool, run_migrations, run_warehouse_migrations, DbPool, WarehouseSync,
};
use gallery_core::{EtlSync, EtlSyncStatus};

use crate::config::{redact_url_password, AppConfig};

/// Which schemas `gallery migrate` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MigrateTarget {
    All,
    Oltp,
    Warehouse,
}

/// Opens both pools. Identical URLs share one pool.
pub async fn connect(config: &AppConfig) -> Result<(DbPool, DbPool)> {
    let db = &config.database;

    println!(
        "  {} Operational database: {}",
        "→".green(),
        redact_url_password(&db.oltp_url)
    );
    let oltp = create_pool(&db.oltp_url)
        .await
        .context("Failed to create operational database pool")?;

    if db.warehouse_url == db.oltp_url {
        return Ok((oltp.clone(), oltp));
    }

    println!(
        "  {} Warehouse database: {}",
        "→".green(),
        redact_url_password(&db.warehouse_url)
    );
    let warehouse = create_pool(&db.warehouse_url)
        .await
        .context("Failed to create warehouse database pool")?;

    Ok((oltp, warehouse))
}

/// Applies pending migrations to the selected schemas.
pub async fn run_migrate(config: &AppConfig, target: MigrateTarget) -> Result<()> {
    println!("{} Running migrations...", "[migrate]".cyan());
    let (oltp, warehouse) = connect(config).await?;

    if matches!(target, MigrateTarget::All | MigrateTarget::Oltp) {
        run_migrations(&oltp)
            .await
            .context("Failed to run operational migrations")?;
        println!("  {} Operational schema up to date", "✓".green());
    }

    if matches!(target, MigrateTarget::All | MigrateTarget::Warehouse) {
        run_warehouse_migrations(&warehouse)
            .await
            .context("Failed to run warehouse migrations")?;
        println!("  {} Warehouse schema up to date", "✓".green());
    }

    oltp.close().await;
    warehouse.close().await;
    Ok(())
}

/// Refreshes the warehouse from the operational database once.
pub async fn run_sync(config: &AppConfig) -> Result<()> {
    println!("{} Refreshing warehouse...", "[sync]".cyan());
    let (oltp, warehouse) = connect(config).await?;

    let outcome = WarehouseSync::new(&oltp, &warehouse).run().await;

    oltp.close().await;
    warehouse.close().await;

    let sync = outcome.context("Warehouse sync failed")?;
    println!("  {}", sync_summary(&sync));
    Ok(())
}

/// One-line outcome of a sync run.
fn sync_summary(sync: &EtlSync) -> String {
    match sync.status {
        EtlSyncStatus::Succeeded => format!(
            "{} {} rows loaded in {} ms",
            "✓".green(),
            sync.rows_processed,
            sync.duration_ms().unwrap_or_default()
        ),
        other => format!("{} Sync finished as {}", "⚠".yellow(), other.as_db_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.oltp_url = "sqlite::memory:".to_string();
        config.database.warehouse_url = "sqlite::memory:".to_string();
        config
    }

    #[test]
    fn test_sync_summary_reports_rows_for_succeeded_run() {
        colored::control::set_override(false);

        let mut sync = EtlSync::start("full_refresh");
        sync.succeed(42);
        let summary = sync_summary(&sync);
        assert!(summary.contains("42 rows loaded"), "{summary}");

        let mut failed = EtlSync::start("full_refresh");
        failed.fail("disk full");
        assert!(sync_summary(&failed).contains("finished as failed"));
    }

    #[tokio::test]
    async fn test_shared_url_shares_pool() {
        let (oltp, warehouse) = connect(&memory_config()).await.unwrap();
        assert!(oltp.is_healthy().await);
        assert!(warehouse.is_healthy().await);

        oltp.close().await;
        assert!(!warehouse.is_healthy().await);
    }

    #[tokio::test]
    async fn test_unsupported_url_is_reported() {
        let mut config = memory_config();
        config.database.oltp_url = "mysql://localhost/gallery".to_string();

        let Err(err) = connect(&config).await else {
            panic!("mysql URL should be rejected");
        };
        assert!(format!("{:#}", err).contains("operational database pool"));
    }
}
