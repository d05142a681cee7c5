//! Seeding commands.

use clap::{Args, Subcommand};

use stockroom_core::config::AppConfig;
use stockroom_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for seed commands
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Seed subcommand
    #[command(subcommand)]
    pub command: SeedCommand,
}

/// Seed subcommands
#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Create the default permissions, admin role and admin user
    Admin,
}

/// Execute seed commands
pub async fn execute(
    args: &SeedArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::services(config).await?;

    match &args.command {
        SeedCommand::Admin => {
            let report = services.bootstrap.populate_admin().await?;
            match format {
                OutputFormat::Json => output::print_item(&report, format),
                OutputFormat::Table => {
                    output::print_success("Admin bootstrap complete.");
                    output::print_kv("Permissions created", &report.permissions_created.to_string());
                    output::print_kv(
                        "Role",
                        &format!("{} ({})", report.role_id, created(report.role_created)),
                    );
                    output::print_kv("Permissions granted", &report.permissions_granted.to_string());
                    output::print_kv(
                        "User",
                        &format!("{} ({})", report.user_id, created(report.user_created)),
                    );
                }
            }
        }
    }

    Ok(())
}

fn created(flag: bool) -> &'static str {
    if flag { "created" } else { "existing" }
}
