//! Change-log read repository.

use std::collections::HashMap;

use sqlx::PgPool;

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_entity::change_log::{Association, ChangeLog, ChangeLogDetail, ChangeLogEntry};

/// Read access to change-log rows and their details.
///
/// Rows are written only through [`crate::store::ChangeLogStore`].
#[derive(Debug, Clone)]
pub struct ChangeLogRepository {
    pool: PgPool,
}

impl ChangeLogRepository {
    /// Create a new change-log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Page through the change log of one entity, oldest first.
    pub async fn list_by_association(
        &self,
        association: Association,
        id: i64,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChangeLogEntry>> {
        let column = association.column();

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM change_logs WHERE {column} = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count change logs", e)
                })?;
        if total == 0 {
            return Ok(PageResponse::empty(page));
        }

        let logs = sqlx::query_as::<_, ChangeLog>(&format!(
            "SELECT * FROM change_logs WHERE {column} = $1 \
             ORDER BY changed_at ASC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list change logs", e))?;

        let ids: Vec<i64> = logs.iter().map(|log| log.id).collect();
        let mut details = self.details_for(&ids).await?;

        let entries = logs
            .into_iter()
            .map(|change_log| ChangeLogEntry {
                details: details.remove(&change_log.id).unwrap_or_default(),
                change_log,
            })
            .collect();

        Ok(PageResponse::new(entries, page, total as u64))
    }

    /// Details of the given change-log rows, grouped by owner.
    pub async fn details_for(&self, ids: &[i64]) -> AppResult<HashMap<i64, Vec<ChangeLogDetail>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ChangeLogDetail>(
            "SELECT * FROM change_log_details WHERE change_log_id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load change log details", e)
        })?;

        let mut grouped: HashMap<i64, Vec<ChangeLogDetail>> = HashMap::new();
        for row in rows {
            grouped.entry(row.change_log_id).or_default().push(row);
        }
        Ok(grouped)
    }
}
