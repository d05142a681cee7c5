//! Embedded schema migrations for the inventory and change-log tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use stockroom_core::error::{AppError, ErrorKind};

/// Migrations compiled in from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every migration the database has not seen yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    info!(known = MIGRATOR.iter().count(), "Stockroom schema is up to date");
    Ok(())
}
