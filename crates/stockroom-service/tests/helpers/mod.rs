//! Shared helpers for the PostgreSQL-backed integration tests.
//!
//! Every test connects to `STOCKROOM_TEST_DATABASE_URL` and is skipped
//! when the variable is unset. Tests share one database, so each names
//! its rows with a unique suffix instead of truncating tables.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use sqlx::PgPool;

use stockroom_core::config::AppConfig;
use stockroom_core::types::pagination::PageRequest;
use stockroom_database::DatabasePool;
use stockroom_entity::change_log::{Association, ChangeLogEntry};
use stockroom_entity::department::CreateDepartment;
use stockroom_service::{MutationOptions, Services, Viewer};

const DATABASE_URL_VAR: &str = "STOCKROOM_TEST_DATABASE_URL";

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Test application context
pub struct TestApp {
    /// Every service, wired like the binary does
    pub services: Services,
    /// Pool for direct queries
    pub db: DatabasePool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Connect and migrate, or `None` when no test database is configured.
    pub async fn try_new() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{DATABASE_URL_VAR} not set, skipping");
            return None;
        };

        let config = AppConfig::from_toml(&format!(
            r#"
            [database]
            url = "{url}"
            max_connections = 4
            min_connections = 0
            run_migrations = true

            [bootstrap]
            admin_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdA$dGVzdGhhc2g"
            "#
        ))
        .expect("Failed to parse test config");

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        let services = Services::new(db.clone(), &config);

        Some(Self {
            services,
            db,
            config,
        })
    }

    /// Raw pool.
    pub fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    /// A name no other test run has used.
    pub fn unique(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{}-{nanos}-{n}", std::process::id())
    }

    /// Create a department for items to belong to.
    pub async fn department(&self) -> i64 {
        self.services
            .departments
            .create(
                CreateDepartment {
                    name: Self::unique("Dept"),
                },
                Some(&MutationOptions::actor(1)),
            )
            .await
            .expect("Failed to create department")
            .id
    }

    /// Full, unmasked change-log trail of one row.
    pub async fn trail(&self, association: Association, id: i64) -> Vec<ChangeLogEntry> {
        self.trail_as(Viewer::Trusted, association, id).await
    }

    /// Change-log trail of one row as seen by `viewer`.
    pub async fn trail_as(
        &self,
        viewer: Viewer,
        association: Association,
        id: i64,
    ) -> Vec<ChangeLogEntry> {
        self.services
            .change_logs
            .list_by_association(viewer, association, id, PageRequest::new(1, 100))
            .await
            .expect("Failed to read change log")
            .data
    }
}

/// Look up a detail by field name.
pub fn detail<'a>(
    entry: &'a ChangeLogEntry,
    field: &str,
) -> &'a stockroom_entity::change_log::ChangeLogDetail {
    entry
        .details
        .iter()
        .find(|d| d.field == field)
        .unwrap_or_else(|| panic!("no detail for {field}"))
}
