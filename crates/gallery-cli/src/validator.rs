//! Startup validation of the gallery configuration.

use crate::config::AppConfig;
use colored::Colorize;
use gallery_observability::LoggingConfig;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that prevent startup.
    pub errors: Vec<String>,
    /// Problems worth fixing that don't prevent startup.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration before startup.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_database_url("database.oltp_url", &config.database.oltp_url, &mut result);
        Self::validate_database_url(
            "database.warehouse_url",
            &config.database.warehouse_url,
            &mut result,
        );
        if config.database.oltp_url == config.database.warehouse_url {
            result.add_warning(
                "The warehouse shares the operational database. Reports will run against \
                 the same connection pool as the API.",
            );
        }

        Self::validate_server(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_database_url(key: &str, url: &str, result: &mut ValidationResult) {
        if url.is_empty() {
            result.add_error(format!("{} is empty", key));
            return;
        }

        if !url.starts_with("sqlite:")
            && !url.starts_with("postgres://")
            && !url.starts_with("postgresql://")
        {
            result.add_error(format!(
                "Invalid {} '{}'. Must start with sqlite: or postgres://",
                key, url
            ));
        }

        if url.starts_with("sqlite::memory:") {
            result.add_warning(format!(
                "{} is an in-memory SQLite database; data is lost on restart",
                key
            ));
        }
    }

    fn validate_server(config: &AppConfig, result: &mut ValidationResult) {
        let server = &config.server;

        if server.port == 0 {
            result.add_error("server.port must be between 1 and 65535");
        }
        if server.request_timeout_secs == 0 {
            result.add_error("server.request_timeout_secs must be at least 1");
        }
        if format!("{}:{}", server.host, server.port)
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            result.add_error(format!("server.host '{}' is not a valid IP address", server.host));
        }

        for origin in &server.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                result.add_error(format!(
                    "CORS origin '{}' must start with http:// or https://",
                    origin
                ));
            }
        }
        if server.cors_origins.is_empty() {
            result.add_warning("server.cors_origins is empty; any origin may call the API");
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        if let Err(e) =
            LoggingConfig::from_level_str(&config.logging.level, config.logging.json_format)
        {
            result.add_error(e.to_string());
        }
    }
}
