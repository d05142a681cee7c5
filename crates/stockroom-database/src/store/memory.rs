//! In-memory change-log store.
//!
//! Used where no database is available. Writes made directly on the store
//! are visible immediately; writes made through [`MemoryTransaction`] are
//! staged and only become visible on [`MemoryTransaction::commit`].

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;
use stockroom_entity::change_log::{ChangeLog, ChangeLogDetail, NewChangeLog, NewChangeLogDetail};

use super::ChangeLogStore;

/// Change-log rows held in memory.
#[derive(Debug, Default)]
pub struct MemoryChangeLogStore {
    change_logs: Vec<ChangeLog>,
    details: Vec<ChangeLogDetail>,
    last_change_log_id: i64,
    last_detail_id: i64,
    failing_fields: HashSet<String>,
    reject_change_logs: bool,
}

impl MemoryChangeLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every detail insert for `field` fail.
    pub fn fail_detail_field(&mut self, field: impl Into<String>) {
        self.failing_fields.insert(field.into());
    }

    /// Make every change-log insert fail.
    pub fn reject_change_logs(&mut self) {
        self.reject_change_logs = true;
    }

    /// Start a staged unit of work.
    pub fn begin(&mut self) -> MemoryTransaction<'_> {
        MemoryTransaction {
            store: self,
            change_logs: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Committed change-log rows, in insertion order.
    pub fn change_logs(&self) -> &[ChangeLog] {
        &self.change_logs
    }

    /// Committed detail rows, in insertion order.
    pub fn details(&self) -> &[ChangeLogDetail] {
        &self.details
    }

    /// Committed details of one change-log row.
    pub fn details_for(&self, change_log_id: i64) -> Vec<&ChangeLogDetail> {
        self.details
            .iter()
            .filter(|d| d.change_log_id == change_log_id)
            .collect()
    }

    fn stage_change_log(&mut self, row: &NewChangeLog) -> AppResult<ChangeLog> {
        if self.reject_change_logs {
            return Err(AppError::database("change_logs insert rejected"));
        }
        self.last_change_log_id += 1;
        Ok(ChangeLog {
            id: self.last_change_log_id,
            operation: row.operation(),
            change_details: row.change_details().cloned(),
            changed_at: row.changed_at(),
            changed_by: row.changed_by(),
            associations: *row.associations(),
        })
    }

    fn stage_detail(&mut self, row: &NewChangeLogDetail) -> AppResult<ChangeLogDetail> {
        if self.failing_fields.contains(row.field()) {
            return Err(AppError::database(format!(
                "change_log_details insert rejected for '{}'",
                row.field()
            )));
        }
        self.last_detail_id += 1;
        Ok(ChangeLogDetail {
            id: self.last_detail_id,
            change_log_id: row.change_log_id(),
            field: row.field().to_string(),
            old_value: row.old_value().cloned(),
            new_value: row.new_value().cloned(),
            diff_type: row.diff_type(),
            metadata: row.metadata().cloned(),
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ChangeLogStore for MemoryChangeLogStore {
    async fn insert_change_log(&mut self, row: &NewChangeLog) -> AppResult<ChangeLog> {
        let log = self.stage_change_log(row)?;
        self.change_logs.push(log.clone());
        Ok(log)
    }

    async fn insert_detail(&mut self, row: &NewChangeLogDetail) -> AppResult<ChangeLogDetail> {
        let detail = self.stage_detail(row)?;
        self.details.push(detail.clone());
        Ok(detail)
    }
}

/// A staged unit of work on a [`MemoryChangeLogStore`].
///
/// Dropping it without committing discards every staged row.
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryChangeLogStore,
    change_logs: Vec<ChangeLog>,
    details: Vec<ChangeLogDetail>,
}

impl MemoryTransaction<'_> {
    /// Publish the staged rows.
    pub fn commit(self) {
        self.store.change_logs.extend(self.change_logs);
        self.store.details.extend(self.details);
    }

    /// Discard the staged rows.
    pub fn rollback(self) {}

    /// Rows staged so far.
    pub fn staged_change_logs(&self) -> &[ChangeLog] {
        &self.change_logs
    }
}

#[async_trait]
impl ChangeLogStore for MemoryTransaction<'_> {
    async fn insert_change_log(&mut self, row: &NewChangeLog) -> AppResult<ChangeLog> {
        let log = self.store.stage_change_log(row)?;
        self.change_logs.push(log.clone());
        Ok(log)
    }

    async fn insert_detail(&mut self, row: &NewChangeLogDetail) -> AppResult<ChangeLogDetail> {
        let detail = self.store.stage_detail(row)?;
        self.details.push(detail.clone());
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_entity::change_log::{ActorId, Association, ChangeLogAssociations, Operation};

    fn new_log() -> NewChangeLog {
        NewChangeLog::new(
            Operation::Create,
            ActorId::SYSTEM,
            ChangeLogAssociations::single(Association::Item, 1),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_transaction_commit_publishes_rows() {
        let mut store = MemoryChangeLogStore::new();
        let mut tx = store.begin();
        let log = tx.insert_change_log(&new_log()).await.unwrap();
        tx.insert_detail(&NewChangeLogDetail::new(log.id, Operation::Create, "name", json!("Pen"), json!(null)))
            .await
            .unwrap();
        assert_eq!(tx.staged_change_logs().len(), 1);
        tx.commit();

        assert_eq!(store.change_logs().len(), 1);
        assert_eq!(store.details_for(log.id).len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_rows() {
        let mut store = MemoryChangeLogStore::new();
        {
            let mut tx = store.begin();
            tx.insert_change_log(&new_log()).await.unwrap();
        }
        assert!(store.change_logs().is_empty());
    }

    #[tokio::test]
    async fn test_failing_field_keeps_siblings() {
        let mut store = MemoryChangeLogStore::new();
        store.fail_detail_field("quantity");
        let log = store.insert_change_log(&new_log()).await.unwrap();

        let bad = NewChangeLogDetail::new(log.id, Operation::Create, "quantity", json!(null), json!(3));
        let good = NewChangeLogDetail::new(log.id, Operation::Create, "name", json!(null), json!("Pen"));
        assert!(store.insert_detail(&bad).await.is_err());
        assert!(store.insert_detail(&good).await.is_ok());
        assert_eq!(store.details().len(), 1);
    }
}
