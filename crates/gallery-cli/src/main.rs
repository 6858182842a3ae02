//! Gallery CLI
//!
//! Hosts the gallery API and runs its maintenance jobs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

mod commands;
mod config;
mod validator;

use commands::{run_migrate, run_server, run_sync, MigrateTarget};
use config::AppConfig;
use gallery_observability::LoggingConfig;
use validator::ConfigValidator;

const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Parser)]
#[command(name = "gallery")]
#[command(author = "Gallery Ledger Team")]
#[command(version)]
#[command(about = "Collection, exhibition and reporting backend for an art gallery", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format for `config` (text, json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Validate configuration and exit without starting the server
        #[arg(long)]
        validate_only: bool,
    },

    /// Apply database migrations
    Migrate {
        /// Schemas to migrate
        #[arg(long, value_enum, default_value_t = MigrateTarget::All)]
        target: MigrateTarget,
    },

    /// Refresh the warehouse from the operational database
    SyncWarehouse,

    /// Validate configuration
    Validate,

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config, cli.verbose)?;

    let mut logging = LoggingConfig::from_level_str(&config.logging.level, config.logging.json_format)
        .unwrap_or_default();
    if cli.verbose {
        logging.level = tracing::Level::DEBUG;
    }
    gallery_observability::init_logging_with_config(logging)
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            validate_only,
        } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            cmd_serve(config, validate_only).await
        }
        Commands::Migrate { target } => run_migrate(&config, target).await,
        Commands::SyncWarehouse => run_sync(&config).await,
        Commands::Validate => cmd_validate(&cli.config, &config),
        Commands::Config { show_secrets } => cmd_config(config, show_secrets, cli.format),
    }
}

/// A missing default file falls back to built-in defaults; an explicit file
/// that cannot be read is an error.
fn load_config(path: &Path, verbose: bool) -> Result<AppConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        if verbose {
            eprintln!("Using default configuration (no config file found)");
        }
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        return Ok(config);
    }
    AppConfig::load(path)
}

async fn cmd_serve(config: AppConfig, validate_only: bool) -> Result<()> {
    println!("{}", "Validating configuration...".cyan());

    let validation_result = ConfigValidator::validate(&config);
    validation_result.print();

    if validation_result.has_errors() {
        println!();
        let message = if validate_only {
            "Configuration validation failed. Fix the errors above before starting the server."
        } else {
            "Server startup aborted due to configuration errors. Fix the errors above and try again."
        };
        println!("{}", message.red().bold());
        std::process::exit(1);
    }

    if validate_only {
        println!();
        println!(
            "{}",
            "Configuration is valid. Server can be started."
                .green()
                .bold()
        );
        return Ok(());
    }

    println!();
    run_server(config).await
}

fn cmd_validate(config_path: &Path, config: &AppConfig) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let validation_result = ConfigValidator::validate(config);
    validation_result.print();

    let redacted = config.redact_secrets();
    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Operational DB: {}", redacted.database.oltp_url);
    println!("  Warehouse DB: {}", redacted.database.warehouse_url);
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  Log level: {}", config.logging.level);

    println!();
    if validation_result.has_errors() {
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}

fn cmd_config(config: AppConfig, show_secrets: bool, format: OutputFormat) -> Result<()> {
    let display_config = if show_secrets {
        config
    } else {
        config.redact_secrets()
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&display_config)?),
        OutputFormat::Text => {
            println!("{}", "Current Configuration".bold());
            println!("─────────────────────────");
            print!("{}", serde_yaml::to_string(&display_config)?);
        }
    }

    Ok(())
}
