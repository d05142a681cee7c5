//! Change-log CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use stockroom_core::config::AppConfig;
use stockroom_core::error::AppError;
use stockroom_entity::change_log::{Association, ChangeLogEntry};
use stockroom_service::Viewer;

use crate::output::{self, OutputFormat};

/// Arguments for changelog commands
#[derive(Debug, Args)]
pub struct ChangelogArgs {
    /// Changelog subcommand
    #[command(subcommand)]
    pub command: ChangelogCommand,
}

/// Changelog subcommands
#[derive(Debug, Subcommand)]
pub enum ChangelogCommand {
    /// List the change log of one entity, oldest first
    List {
        /// Entity kind (item, category, department, role, permission, user)
        #[arg(short, long)]
        association: Association,
        /// Entity id
        #[arg(long)]
        id: i64,
        /// Page number
        #[arg(short, long)]
        page: Option<u64>,
        /// Entries per page
        #[arg(long)]
        page_size: Option<u64>,
        /// Show sensitive values unmasked
        #[arg(long)]
        reveal_sensitive: bool,
    },
}

/// One detail line of the change-log table
#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    /// Change-log id
    id: i64,
    /// Time
    time: String,
    /// Actor
    actor: String,
    /// Operation
    operation: String,
    /// Field
    field: String,
    /// Old value
    old: String,
    /// New value
    new: String,
}

/// Execute changelog commands
pub async fn execute(
    args: &ChangelogArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::services(config).await?;

    match &args.command {
        ChangelogCommand::List {
            association,
            id,
            page,
            page_size,
            reveal_sensitive,
        } => {
            let viewer = if *reveal_sensitive {
                Viewer::Trusted
            } else {
                Viewer::Generic
            };
            let request = services.change_logs.page_request(*page, *page_size);
            let response = services
                .change_logs
                .list_by_association(viewer, *association, *id, request)
                .await?;

            match format {
                OutputFormat::Json => output::print_item(&response, format),
                OutputFormat::Table => {
                    let rows: Vec<ChangeRow> = response.data.iter().flat_map(rows_for).collect();
                    output::print_list(&rows, format);
                    output::print_kv(
                        "Page",
                        &format!("{} of {}", response.current_page, response.total_pages),
                    );
                    output::print_kv("Total", &response.total.to_string());
                    if response.has_next() {
                        output::print_kv(
                            "Next",
                            &format!("--page {}", response.current_page + 1),
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn rows_for(entry: &ChangeLogEntry) -> Vec<ChangeRow> {
    let log = &entry.change_log;
    let row = |field: String, old: String, new: String| ChangeRow {
        id: log.id,
        time: log.changed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        actor: log.changed_by.to_string(),
        operation: log.operation.to_string(),
        field,
        old,
        new,
    };

    if entry.details.is_empty() {
        return vec![row(String::new(), String::new(), String::new())];
    }
    entry
        .details
        .iter()
        .map(|d| {
            row(
                d.field.clone(),
                display(d.old_value.as_ref()),
                display(d.new_value.as_ref()),
            )
        })
        .collect()
}

fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
