//! Adapter between persistence lifecycle events and the change-log writer.

use tracing::debug;

use stockroom_core::result::AppResult;
use stockroom_database::store::ChangeLogStore;
use stockroom_entity::change_log::{ActorId, Operation};
use stockroom_entity::tracked::{EntityChange, ModelName, Snapshot, Tracked};

use super::writer::{ChangeLogReport, ChangeLogWriter, WriteRequest};
use crate::context::MutationOptions;

/// The lifecycle event that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Rows were inserted.
    Create,
    /// Rows were modified.
    Update,
    /// Rows were removed.
    Destroy,
}

impl HookAction {
    /// The operation a row of `model` is logged as.
    ///
    /// Inserting or removing a join row associates or dissociates the
    /// rows it references.
    pub fn declared_operation(&self, model: ModelName) -> Operation {
        let is_join = model.association().is_none();
        match self {
            Self::Create if is_join => Operation::Link,
            Self::Destroy if is_join => Operation::Unlink,
            Self::Create => Operation::Create,
            Self::Update => Operation::Update,
            Self::Destroy => Operation::Delete,
        }
    }
}

/// Rows affected by a single lifecycle event.
#[derive(Debug, Clone, Copy)]
pub enum Affected<'a> {
    /// A single-row mutation.
    One(&'a EntityChange),
    /// A bulk mutation.
    Many(&'a [EntityChange]),
}

impl<'a> Affected<'a> {
    fn as_slice(&self) -> &'a [EntityChange] {
        match *self {
            Self::One(change) => std::slice::from_ref(change),
            Self::Many(changes) => changes,
        }
    }
}

/// Normalizes lifecycle events into change-log writes.
#[derive(Debug, Clone, Default)]
pub struct EntityHookAdapter {
    writer: ChangeLogWriter,
}

impl EntityHookAdapter {
    /// Create an adapter around `writer`.
    pub fn new(writer: ChangeLogWriter) -> Self {
        Self { writer }
    }

    /// Capture rows about to be mutated.
    ///
    /// Join rows must be captured before they are deleted: their foreign
    /// keys cannot be read back afterwards.
    pub fn before_mutation<T: Tracked>(&self, rows: &[T]) -> AppResult<Vec<Snapshot>> {
        rows.iter().map(T::snapshot).collect()
    }

    /// Log the rows affected by a lifecycle event.
    ///
    /// Every row gets its own change-log row. `options: None` marks an
    /// internal call, which is not logged.
    pub async fn after_mutation<S>(
        &self,
        action: HookAction,
        affected: Affected<'_>,
        options: Option<&MutationOptions>,
        model: ModelName,
        store: &mut S,
    ) -> AppResult<Vec<ChangeLogReport>>
    where
        S: ChangeLogStore + ?Sized,
    {
        let Some(options) = options else {
            debug!(model = %model, "Internal mutation, change log skipped");
            return Ok(Vec::new());
        };
        let actor = ActorId::require(options.actor_id)?;
        let operation = action.declared_operation(model);

        let mut reports = Vec::new();
        for change in affected.as_slice() {
            let mut request = WriteRequest::new(change, operation, Some(actor.get()));
            request.model = model;
            reports.extend(self.writer.write(&request, &mut *store).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_core::error::ErrorKind;
    use stockroom_database::MemoryChangeLogStore;
    use stockroom_entity::change_log::DiffType;
    use stockroom_entity::join::UserRole;

    fn linked(rows: &[UserRole]) -> Vec<EntityChange> {
        rows.iter()
            .map(|r| EntityChange::created(r.snapshot().unwrap()))
            .collect()
    }

    #[test]
    fn test_declared_operation_for_join_models() {
        assert_eq!(HookAction::Create.declared_operation(ModelName::UserRole), Operation::Link);
        assert_eq!(HookAction::Destroy.declared_operation(ModelName::RolePermission), Operation::Unlink);
        assert_eq!(HookAction::Create.declared_operation(ModelName::Item), Operation::Create);
        assert_eq!(HookAction::Destroy.declared_operation(ModelName::Role), Operation::Delete);
        assert_eq!(HookAction::Update.declared_operation(ModelName::User), Operation::Update);
    }

    #[tokio::test]
    async fn test_bulk_link_logs_each_row() {
        let mut store = MemoryChangeLogStore::new();
        let changes = linked(&[UserRole::new(3, 9), UserRole::new(3, 10)]);

        let reports = EntityHookAdapter::default()
            .after_mutation(
                HookAction::Create,
                Affected::Many(&changes),
                Some(&MutationOptions::actor(1)),
                ModelName::UserRole,
                &mut store,
            )
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        for (log, role) in store.change_logs().iter().zip([9, 10]) {
            assert_eq!(log.operation, Operation::Link);
            assert_eq!(log.associations.user_id, Some(3));
            assert_eq!(log.associations.role_id, Some(role));
            let details = store.details_for(log.id);
            assert_eq!(details.len(), 2);
            assert!(details.iter().all(|d| d.diff_type == DiffType::Added && d.old_value.is_none()));
        }
    }

    #[tokio::test]
    async fn test_unlink_from_before_destroy_snapshot() {
        let mut store = MemoryChangeLogStore::new();
        let adapter = EntityHookAdapter::default();
        let rows = vec![UserRole::new(3, 9)];

        let snapshots = adapter.before_mutation(&rows).unwrap();
        drop(rows);
        let changes: Vec<_> = snapshots.into_iter().map(EntityChange::deleted).collect();

        adapter
            .after_mutation(
                HookAction::Destroy,
                Affected::Many(&changes),
                Some(&MutationOptions::actor(1)),
                ModelName::UserRole,
                &mut store,
            )
            .await
            .unwrap();

        let log = &store.change_logs()[0];
        assert_eq!(log.operation, Operation::Unlink);
        assert_eq!(log.associations.user_id, Some(3));
        assert_eq!(log.associations.role_id, Some(9));
        let details = store.details_for(log.id);
        assert_eq!(details[0].field, "user_id");
        assert_eq!(details[0].old_value, Some(json!(3)));
        assert_eq!(details[1].old_value, Some(json!(9)));
        assert!(details.iter().all(|d| d.new_value.is_none() && d.diff_type == DiffType::Removed));
    }

    #[tokio::test]
    async fn test_internal_call_is_not_logged() {
        let mut store = MemoryChangeLogStore::new();
        let changes = linked(&[UserRole::new(1, 1)]);

        let reports = EntityHookAdapter::default()
            .after_mutation(
                HookAction::Create,
                Affected::One(&changes[0]),
                None,
                ModelName::UserRole,
                &mut store,
            )
            .await
            .unwrap();

        assert!(reports.is_empty());
        assert!(store.change_logs().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_without_actor_writes_nothing() {
        let mut store = MemoryChangeLogStore::new();
        let changes = linked(&[UserRole::new(3, 9), UserRole::new(3, 10)]);

        for options in [MutationOptions::default(), MutationOptions { actor_id: Some(-4) }] {
            let err = EntityHookAdapter::default()
                .after_mutation(
                    HookAction::Create,
                    Affected::Many(&changes),
                    Some(&options),
                    ModelName::UserRole,
                    &mut store,
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::MissingActor);
        }
        assert!(store.change_logs().is_empty());
    }
}
