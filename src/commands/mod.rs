//! CLI command definitions and dispatch.

pub mod changelog;
pub mod migrate;
pub mod seed;

use clap::{Parser, Subcommand};

use stockroom_core::config::AppConfig;
use stockroom_core::error::AppError;
use stockroom_database::DatabasePool;
use stockroom_service::Services;

use crate::output::OutputFormat;

/// Stockroom inventory backend administration
#[derive(Debug, Parser)]
#[command(name = "stockroom", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Seed initial data
    Seed(seed::SeedArgs),
    /// Read the change-log trail
    Changelog(changelog::ChangelogArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Seed(args) => seed::execute(args, &config, self.format).await,
            Commands::Changelog(args) => changelog::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the configured database.
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        return Err(AppError::database("Database health check failed"));
    }
    Ok(db)
}

/// Helper: connect and wire every service.
pub async fn services(config: &AppConfig) -> Result<Services, AppError> {
    let db = connect(config).await?;
    Ok(Services::new(db, config))
}
