//! PostgreSQL change-log store.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_entity::change_log::{ChangeLog, ChangeLogDetail, NewChangeLog, NewChangeLogDetail};

use super::ChangeLogStore;

#[async_trait]
impl ChangeLogStore for PgConnection {
    async fn insert_change_log(&mut self, row: &NewChangeLog) -> AppResult<ChangeLog> {
        let assoc = row.associations();
        sqlx::query_as::<_, ChangeLog>(
            "INSERT INTO change_logs \
             (operation, change_details, changed_at, changed_by, \
              item_id, category_id, department_id, role_id, permission_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(row.operation())
        .bind(row.change_details())
        .bind(row.changed_at())
        .bind(row.changed_by())
        .bind(assoc.item_id)
        .bind(assoc.category_id)
        .bind(assoc.department_id)
        .bind(assoc.role_id)
        .bind(assoc.permission_id)
        .bind(assoc.user_id)
        .fetch_one(self)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert change log", e))
    }

    async fn insert_detail(&mut self, row: &NewChangeLogDetail) -> AppResult<ChangeLogDetail> {
        // Nested begin issues a SAVEPOINT when a transaction is already open.
        let mut savepoint = self.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to open detail savepoint", e)
        })?;

        let inserted = sqlx::query_as::<_, ChangeLogDetail>(
            "INSERT INTO change_log_details \
             (change_log_id, field, old_value, new_value, diff_type, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(row.change_log_id())
        .bind(row.field())
        .bind(row.old_value())
        .bind(row.new_value())
        .bind(row.diff_type())
        .bind(row.metadata())
        .fetch_one(&mut *savepoint)
        .await;

        match inserted {
            Ok(detail) => {
                savepoint.commit().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to release detail savepoint", e)
                })?;
                Ok(detail)
            }
            Err(e) => {
                savepoint.rollback().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to roll back detail savepoint",
                        e,
                    )
                })?;
                Err(AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to insert change log detail '{}'", row.field()),
                    e,
                ))
            }
        }
    }
}
