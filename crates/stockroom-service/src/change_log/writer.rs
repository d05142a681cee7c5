//! Persists change-log rows and their details.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_database::store::ChangeLogStore;
use stockroom_entity::change_log::{
    ActorId, ChangeLog, ChangeLogAssociations, NewChangeLog, NewChangeLogDetail, Operation,
};
use stockroom_entity::tracked::{EntityChange, ModelName};

use super::diff::{DiffEngine, FieldDiff, RelationRef};
use super::inference::OperationInferencer;

/// Everything needed to log one mutated row.
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    /// Before/after state of the row.
    pub change: &'a EntityChange,
    /// The operation the caller performed.
    pub operation: Operation,
    /// Raw id of the acting user.
    pub actor_id: Option<i64>,
    /// The row's model.
    pub model: ModelName,
    /// The row's primary id.
    pub model_id: i64,
    /// Foreign key named by an explicit `link`/`unlink`.
    pub relation: Option<&'a str>,
    /// Id of the related row for an explicit `link`/`unlink`.
    pub related_id: Option<i64>,
}

impl<'a> WriteRequest<'a> {
    /// Log `change` as `operation` on behalf of `actor_id`.
    pub fn new(change: &'a EntityChange, operation: Operation, actor_id: Option<i64>) -> Self {
        Self {
            change,
            operation,
            actor_id,
            model: change.model(),
            model_id: change.id(),
            relation: None,
            related_id: None,
        }
    }

    /// Name the relation an explicit `link`/`unlink` refers to.
    pub fn with_relation(mut self, relation: &'a str, related_id: Option<i64>) -> Self {
        self.relation = Some(relation);
        self.related_id = related_id;
        self
    }
}

/// Result of persisting one detail row.
#[derive(Debug, Clone)]
pub enum DetailStatus {
    /// Stored with the given id.
    Persisted(i64),
    /// Not stored; the parent row and sibling details are unaffected.
    Failed(AppError),
}

/// Per-field outcome of a change-log write.
#[derive(Debug, Clone)]
pub struct DetailOutcome {
    /// Attribute the detail describes.
    pub field: String,
    /// What happened to it.
    pub status: DetailStatus,
}

impl DetailOutcome {
    /// Whether the detail was stored.
    pub fn is_persisted(&self) -> bool {
        matches!(self.status, DetailStatus::Persisted(_))
    }
}

/// One persisted change-log row and the fate of its details.
#[derive(Debug, Clone)]
pub struct ChangeLogReport {
    /// The stored row.
    pub change_log: ChangeLog,
    /// One outcome per computed diff, in field order.
    pub outcomes: Vec<DetailOutcome>,
}

impl ChangeLogReport {
    /// Details that could not be stored.
    pub fn failures(&self) -> impl Iterator<Item = &DetailOutcome> {
        self.outcomes.iter().filter(|o| !o.is_persisted())
    }
}

/// Writes change-log rows through a caller-supplied store handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeLogWriter {
    diff: DiffEngine,
    inferencer: OperationInferencer,
}

impl ChangeLogWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log one mutated row.
    ///
    /// Returns one report per change-log row written. An update with no
    /// reportable differences writes nothing and returns an empty list.
    pub async fn write<S>(
        &self,
        request: &WriteRequest<'_>,
        store: &mut S,
    ) -> AppResult<Vec<ChangeLogReport>>
    where
        S: ChangeLogStore + ?Sized,
    {
        let actor = ActorId::require(request.actor_id)?;
        let change = request.change;

        if change.model() != request.model {
            return Err(AppError::internal(format!(
                "Change for {} logged as {}",
                change.model(),
                request.model
            )));
        }

        let associations = resolve_associations(request.model, request.model_id, change)?;
        let explicit = self.explicit_relation(request)?;

        let events: Vec<(Operation, Option<RelationRef>)> = match explicit {
            Some(relation) if request.operation.is_relational() => {
                vec![(request.operation, Some(relation))]
            }
            _ => self
                .inferencer
                .plan(change, request.operation)
                .into_iter()
                .map(|event| (event.operation, event.relation.map(RelationRef::new)))
                .collect(),
        };

        let mut reports = Vec::with_capacity(events.len());
        for (operation, relation) in events {
            let diffs = self.diff.diff(change, operation, relation.as_ref());
            if diffs.is_empty() && operation == Operation::Update {
                debug!(
                    model = %request.model,
                    model_id = request.model_id,
                    "No changes detected, change log skipped"
                );
                continue;
            }

            let details = change_details(change, operation, relation.as_ref());
            let row = NewChangeLog::new(operation, actor, associations, details)?;
            let change_log = store.insert_change_log(&row).await?;
            let outcomes = persist_details(&mut *store, &change_log, operation, diffs).await;

            info!(
                change_log_id = change_log.id,
                operation = %operation,
                changed_by = %actor,
                model = %request.model,
                model_id = request.model_id,
                details = outcomes.len(),
                "Change log written"
            );
            reports.push(ChangeLogReport {
                change_log,
                outcomes,
            });
        }

        Ok(reports)
    }

    fn explicit_relation(&self, request: &WriteRequest<'_>) -> AppResult<Option<RelationRef>> {
        let Some(name) = request.relation else {
            return Ok(None);
        };
        let field = request
            .change
            .current()
            .fields()
            .iter()
            .find(|f| f.name == name && f.is_relation())
            .ok_or_else(|| {
                AppError::validation(format!("{} has no relation '{name}'", request.model))
            })?;
        Ok(Some(RelationRef {
            field,
            related_id: request.related_id,
        }))
    }
}

/// The association columns a row of `model` is recorded under.
///
/// Join rows set one column per foreign key on the same change-log row.
fn resolve_associations(
    model: ModelName,
    model_id: i64,
    change: &EntityChange,
) -> AppResult<ChangeLogAssociations> {
    if let Some(association) = model.association() {
        return Ok(ChangeLogAssociations::single(association, model_id));
    }

    let snapshot = change.current();
    if !snapshot.is_join_row() {
        return Err(AppError::unknown_association(format!(
            "Model {model} has no change-log association"
        )));
    }

    let mut associations = ChangeLogAssociations::default();
    for (field, value) in snapshot.relations() {
        let association = field.relation_target().and_then(|t| t.association());
        if let (Some(association), Some(id)) = (association, value.as_i64()) {
            associations.set(association, id);
        }
    }
    Ok(associations)
}

fn change_details(
    change: &EntityChange,
    operation: Operation,
    relation: Option<&RelationRef>,
) -> Option<Value> {
    if !operation.is_relational() {
        return None;
    }
    match relation {
        Some(relation) if !change.current().is_join_row() => {
            let related_id = match operation {
                Operation::Unlink => relation.unlinked_value(change),
                _ => relation.linked_value(change),
            };
            Some(json!({ "relation": relation.field.name, "related_id": related_id }))
        }
        _ => Some(json!({ "relation": change.model().as_str() })),
    }
}

async fn persist_details<S>(
    store: &mut S,
    change_log: &ChangeLog,
    operation: Operation,
    diffs: Vec<FieldDiff>,
) -> Vec<DetailOutcome>
where
    S: ChangeLogStore + ?Sized,
{
    let mut outcomes = Vec::with_capacity(diffs.len());
    for diff in diffs {
        let row = NewChangeLogDetail::new(
            change_log.id,
            operation,
            diff.field,
            diff.old_value,
            diff.new_value,
        );
        let status = match store.insert_detail(&row).await {
            Ok(detail) => DetailStatus::Persisted(detail.id),
            Err(e) => {
                warn!(
                    change_log_id = change_log.id,
                    field = diff.field,
                    error = %e,
                    "Failed to persist change log detail"
                );
                DetailStatus::Failed(AppError::with_source(
                    ErrorKind::DetailPersist,
                    format!("Failed to persist detail '{}'", diff.field),
                    e,
                ))
            }
        };
        outcomes.push(DetailOutcome {
            field: diff.field.to_string(),
            status,
        });
    }
    outcomes
}
