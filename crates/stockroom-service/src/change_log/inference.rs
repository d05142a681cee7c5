//! Resolves the operation a mutation is logged as.

use serde_json::Value;

use stockroom_entity::change_log::Operation;
use stockroom_entity::tracked::{EntityChange, FieldDescriptor};

/// One change-log event derived from a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedEvent {
    /// The effective operation.
    pub operation: Operation,
    /// The foreign key a `link`/`unlink` event refers to.
    pub relation: Option<&'static FieldDescriptor>,
}

impl PlannedEvent {
    fn plain(operation: Operation) -> Self {
        Self {
            operation,
            relation: None,
        }
    }
}

/// Reclassifies updates that only move a foreign key.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationInferencer;

impl OperationInferencer {
    /// The effective operation of a single-event mutation.
    ///
    /// An update whose changed fields include a foreign key becomes an
    /// `unlink` when the key was cleared and a `link` otherwise. When
    /// several keys move, the first declared one decides.
    pub fn infer(&self, change: &EntityChange, declared: Operation) -> Operation {
        self.plan(change, declared)
            .iter()
            .find(|event| event.relation.is_some())
            .map(|event| event.operation)
            .unwrap_or(declared)
    }

    /// Every event a mutation produces.
    ///
    /// Updates yield one `update` event when a business attribute changed
    /// followed by one `link`/`unlink` event per moved foreign key. An
    /// update that moved nothing still yields a single `update` event,
    /// which diffs to nothing.
    pub fn plan(&self, change: &EntityChange, declared: Operation) -> Vec<PlannedEvent> {
        if declared != Operation::Update {
            return vec![PlannedEvent::plain(declared)];
        }

        let changed = change.changed_fields();
        let mut events = Vec::new();

        if changed.iter().any(|field| field.is_scalar()) {
            events.push(PlannedEvent::plain(Operation::Update));
        }

        events.extend(changed.into_iter().filter(|f| f.is_relation()).map(|field| {
            let operation = match change.value(field.name) {
                Value::Null => Operation::Unlink,
                _ => Operation::Link,
            };
            PlannedEvent {
                operation,
                relation: Some(field),
            }
        }));

        if events.is_empty() {
            events.push(PlannedEvent::plain(Operation::Update));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_entity::tracked::{ModelName, Snapshot};

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::relation("category_id", ModelName::Category),
        FieldDescriptor::relation("department_id", ModelName::Department),
        FieldDescriptor::timestamp("updated_at"),
    ];

    fn item(name: &str, category: Value, department: Value) -> Snapshot {
        Snapshot::from_values(
            ModelName::Item,
            1,
            FIELDS,
            vec![json!(1), json!(name), category, department, json!("t")],
        )
        .unwrap()
    }

    fn update(before: Snapshot, after: Snapshot) -> EntityChange {
        EntityChange::updated(before, after).unwrap()
    }

    #[test]
    fn test_non_update_is_unchanged() {
        let change = EntityChange::created(item("Pen", Value::Null, json!(1)));
        for op in [Operation::Create, Operation::Delete, Operation::Link, Operation::Unlink] {
            assert_eq!(OperationInferencer.infer(&change, op), op);
        }
    }

    #[test]
    fn test_relation_set_is_link() {
        let change = update(item("Pen", Value::Null, json!(1)), item("Pen", json!(5), json!(1)));
        assert_eq!(OperationInferencer.infer(&change, Operation::Update), Operation::Link);
    }

    #[test]
    fn test_relation_cleared_is_unlink() {
        let change = update(item("Pen", json!(5), json!(1)), item("Pen", Value::Null, json!(1)));
        assert_eq!(OperationInferencer.infer(&change, Operation::Update), Operation::Unlink);
    }

    #[test]
    fn test_scalar_change_stays_update() {
        let change = update(item("Pen", json!(5), json!(1)), item("Marker", json!(5), json!(1)));
        assert_eq!(OperationInferencer.infer(&change, Operation::Update), Operation::Update);
        assert_eq!(
            OperationInferencer.plan(&change, Operation::Update),
            vec![PlannedEvent::plain(Operation::Update)]
        );
    }

    #[test]
    fn test_plan_splits_mixed_update() {
        let change = update(
            item("Pen", json!(5), json!(1)),
            item("Marker", Value::Null, json!(2)),
        );
        let plan = OperationInferencer.plan(&change, Operation::Update);
        let ops: Vec<_> = plan.iter().map(|e| e.operation).collect();
        assert_eq!(ops, vec![Operation::Update, Operation::Unlink, Operation::Link]);
        assert_eq!(plan[1].relation.map(|f| f.name), Some("category_id"));
        assert_eq!(plan[2].relation.map(|f| f.name), Some("department_id"));
    }

    #[test]
    fn test_plan_for_unchanged_update_is_single_update() {
        let change = update(item("Pen", Value::Null, json!(1)), item("Pen", Value::Null, json!(1)));
        assert_eq!(
            OperationInferencer.plan(&change, Operation::Update),
            vec![PlannedEvent::plain(Operation::Update)]
        );
    }
}
