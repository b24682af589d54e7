//! Configuration management for the stock replenishment service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with REPL_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{
    validate_email, validate_http_url, CategoryPolicy, PolicyTable, ReorderStrategy, WindowMode,
};

use crate::error::{AppError, AppResult};

const SECONDS_PER_HOUR: u64 = 3600;

/// One year
pub const MAX_INTERVAL_HOURS: u64 = 24 * 366;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Periodic run configuration
    pub scheduler: SchedulerConfig,

    /// Reorder calculation settings
    pub replenishment: ReplenishmentConfig,

    /// Report delivery settings
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Run replenishment periodically
    pub enabled: bool,

    /// Hours between two runs
    pub interval_hours: u64,

    /// Run once immediately at startup instead of waiting a full interval
    pub run_on_startup: bool,
}

/// Which reorder model a run uses
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Composite,
    FlatPercentage,
}

/// One entry of the category lead-time table
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CategoryPolicyEntry {
    pub category: String,
    pub lead_time_days: f64,
    pub lead_time_std_dev_days: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplenishmentConfig {
    pub strategy: StrategyKind,

    /// Service level Z-score for the composite model
    pub z_score: f64,

    /// Buffer on average monthly outflow for the flat model
    pub buffer_factor: f64,

    /// Placement of the 12-month outflow window
    pub window: WindowMode,

    /// Ledger movements of this voucher type are ignored
    pub reconciliation_voucher_type: String,

    /// Warehouses whose name contains this marker are treated as retired
    pub retired_location_marker: Option<String>,

    /// Policy for categories missing from `categories`
    pub default_policy: CategoryPolicy,

    #[serde(default)]
    pub categories: Vec<CategoryPolicyEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Mail API endpoint accepting JSON messages
    pub api_endpoint: String,

    /// Mail API key
    pub api_key: String,

    /// Sender address
    pub sender: String,

    /// Operational recipient of the reorder report
    pub recipient: String,

    pub subject: String,

    /// Prefix of the link rendered for each item code
    pub item_link_base: String,

    /// Upper bound on one mail API request
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("REPL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.interval_hours", 24)?
            .set_default("scheduler.run_on_startup", false)?
            .set_default("replenishment.strategy", "composite")?
            .set_default("replenishment.z_score", shared::DEFAULT_Z_SCORE)?
            .set_default("replenishment.buffer_factor", shared::DEFAULT_BUFFER_FACTOR)?
            .set_default("replenishment.window", "previous_year")?
            .set_default("replenishment.reconciliation_voucher_type", "Stock Reconciliation")?
            .set_default(
                "replenishment.default_policy.lead_time_days",
                shared::DEFAULT_LEAD_TIME_DAYS,
            )?
            .set_default(
                "replenishment.default_policy.lead_time_std_dev_days",
                shared::DEFAULT_LEAD_TIME_STD_DEV_DAYS,
            )?
            .set_default("mail.subject", "Safety Stock Report on Items")?
            .set_default("mail.timeout_seconds", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (REPL_ prefix)
            .add_source(
                Environment::with_prefix("REPL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> AppResult<()> {
        if self.scheduler.enabled {
            self.scheduler.period()?;
        }
        self.replenishment.strategy()?;
        self.replenishment.policy_table()?;
        self.mail.validate()?;
        Ok(())
    }
}

impl SchedulerConfig {
    /// Time between two runs, between one hour and `MAX_INTERVAL_HOURS`
    pub fn period(&self) -> AppResult<Duration> {
        if self.interval_hours == 0 || self.interval_hours > MAX_INTERVAL_HOURS {
            return Err(AppError::Configuration(format!(
                "scheduler.interval_hours must be between 1 and {}, got {}",
                MAX_INTERVAL_HOURS, self.interval_hours
            )));
        }
        Ok(Duration::from_secs(self.interval_hours * SECONDS_PER_HOUR))
    }
}

impl ReplenishmentConfig {
    /// Build the reorder strategy selected by configuration
    pub fn strategy(&self) -> AppResult<ReorderStrategy> {
        let strategy = match self.strategy {
            StrategyKind::Composite => ReorderStrategy::Composite {
                z_score: self.z_score,
            },
            StrategyKind::FlatPercentage => ReorderStrategy::FlatPercentage {
                buffer_factor: self.buffer_factor,
            },
        };
        strategy
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(strategy)
    }

    /// Build the validated category policy table
    pub fn policy_table(&self) -> AppResult<PolicyTable> {
        let table = self
            .categories
            .iter()
            .fold(PolicyTable::new(self.default_policy), |table, entry| {
                table.with_policy(
                    entry.category.clone(),
                    CategoryPolicy::new(entry.lead_time_days, entry.lead_time_std_dev_days),
                )
            });
        table
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(table)
    }
}

impl MailConfig {
    pub fn validate(&self) -> AppResult<()> {
        validate_http_url(&self.api_endpoint)
            .map_err(|e| AppError::Configuration(format!("mail.api_endpoint: {}", e)))?;
        validate_email(&self.sender)
            .map_err(|e| AppError::Configuration(format!("mail.sender: {}", e)))?;
        validate_email(&self.recipient)
            .map_err(|e| AppError::Configuration(format!("mail.recipient: {}", e)))?;
        if self.timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "mail.timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
