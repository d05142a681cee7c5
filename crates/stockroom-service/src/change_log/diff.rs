//! Field-level diffs between the two sides of an entity change.

use serde::Serialize;
use serde_json::Value;

use stockroom_entity::change_log::{DiffType, Operation};
use stockroom_entity::tracked::{EntityChange, FieldDescriptor};

/// One attribute difference, ready to be stored as a change-log detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    /// Attribute name.
    pub field: &'static str,
    /// Value before the change.
    pub old_value: Value,
    /// Value after the change.
    pub new_value: Value,
    /// Classification derived from the operation.
    pub diff_type: DiffType,
}

impl FieldDiff {
    fn new(field: &'static str, old_value: Value, new_value: Value, operation: Operation) -> Self {
        Self {
            field,
            old_value,
            new_value,
            diff_type: operation.diff_type(),
        }
    }
}

/// The relation a `link` or `unlink` on a business entity refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationRef {
    /// The foreign-key attribute.
    pub field: &'static FieldDescriptor,
    /// Explicit id of the related row, when the caller knows it.
    pub related_id: Option<i64>,
}

impl RelationRef {
    /// Refer to `field` without an explicit related id.
    pub fn new(field: &'static FieldDescriptor) -> Self {
        Self {
            field,
            related_id: None,
        }
    }

    /// Value the relation points at after a link.
    pub fn linked_value(&self, change: &EntityChange) -> Value {
        match self.related_id {
            Some(id) => Value::from(id),
            None => change.value(self.field.name).clone(),
        }
    }

    /// Value the relation pointed at before an unlink.
    pub fn unlinked_value(&self, change: &EntityChange) -> Value {
        match (change.previous(self.field.name), self.related_id) {
            (Value::Null, Some(id)) => Value::from(id),
            (Value::Null, None) => change
                .current()
                .get(self.field.name)
                .cloned()
                .unwrap_or(Value::Null),
            (previous, _) => previous.clone(),
        }
    }
}

/// Computes the details of one change-log row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Diff `change` as `operation`.
    ///
    /// `relation` is only consulted for `link`/`unlink` on business
    /// entities; join rows always report every foreign key.
    pub fn diff(
        &self,
        change: &EntityChange,
        operation: Operation,
        relation: Option<&RelationRef>,
    ) -> Vec<FieldDiff> {
        match operation {
            Operation::Create => self.diff_created(change),
            Operation::Delete => self.diff_deleted(change),
            Operation::Update => self.diff_updated(change),
            Operation::Link | Operation::Unlink => match relation {
                Some(relation) if !change.current().is_join_row() => {
                    vec![self.diff_relation(change, operation, relation)]
                }
                _ => self.diff_foreign_keys(change, operation),
            },
        }
    }

    fn diff_created(&self, change: &EntityChange) -> Vec<FieldDiff> {
        change
            .current()
            .attributes()
            .map(|(field, value)| FieldDiff::new(field.name, Value::Null, value.clone(), Operation::Create))
            .collect()
    }

    fn diff_deleted(&self, change: &EntityChange) -> Vec<FieldDiff> {
        change
            .current()
            .attributes()
            .map(|(field, value)| FieldDiff::new(field.name, value.clone(), Value::Null, Operation::Delete))
            .collect()
    }

    fn diff_updated(&self, change: &EntityChange) -> Vec<FieldDiff> {
        let changed: Vec<&FieldDescriptor> = change
            .changed_fields()
            .into_iter()
            .filter(|field| !field.is_relation())
            .collect();

        if !changed.iter().any(|field| field.is_scalar()) {
            return Vec::new();
        }

        changed
            .into_iter()
            .map(|field| {
                FieldDiff::new(
                    field.name,
                    change.previous(field.name).clone(),
                    change.value(field.name).clone(),
                    Operation::Update,
                )
            })
            .collect()
    }

    fn diff_foreign_keys(&self, change: &EntityChange, operation: Operation) -> Vec<FieldDiff> {
        change
            .current()
            .relations()
            .map(|(field, value)| match operation {
                Operation::Unlink => FieldDiff::new(field.name, value.clone(), Value::Null, operation),
                _ => FieldDiff::new(field.name, Value::Null, value.clone(), operation),
            })
            .collect()
    }

    fn diff_relation(
        &self,
        change: &EntityChange,
        operation: Operation,
        relation: &RelationRef,
    ) -> FieldDiff {
        let name = relation.field.name;
        match operation {
            Operation::Unlink => {
                FieldDiff::new(name, relation.unlinked_value(change), Value::Null, operation)
            }
            _ => FieldDiff::new(
                name,
                change.previous(name).clone(),
                relation.linked_value(change),
                operation,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_entity::tracked::{ModelName, Snapshot};

    const ITEM_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::scalar("quantity"),
        FieldDescriptor::relation("category_id", ModelName::Category),
        FieldDescriptor::timestamp("updated_at"),
    ];

    const USER_ROLE_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::relation("user_id", ModelName::User),
        FieldDescriptor::relation("role_id", ModelName::Role),
    ];

    fn item(name: &str, quantity: i64, category: Value, updated: &str) -> Snapshot {
        Snapshot::from_values(
            ModelName::Item,
            1,
            ITEM_FIELDS,
            vec![json!(1), json!(name), json!(quantity), category, json!(updated)],
        )
        .unwrap()
    }

    fn user_role(user: i64, role: i64) -> Snapshot {
        Snapshot::from_values(ModelName::UserRole, user, USER_ROLE_FIELDS, vec![json!(user), json!(role)])
            .unwrap()
    }

    #[test]
    fn test_create_reports_every_attribute_as_added() {
        let change = EntityChange::created(item("Pen", 10, Value::Null, "t1"));
        let diffs = DiffEngine.diff(&change, Operation::Create, None);
        assert_eq!(diffs.len(), ITEM_FIELDS.len());
        assert!(diffs.iter().all(|d| d.old_value.is_null() && d.diff_type == DiffType::Added));
        assert_eq!(diffs[1].new_value, json!("Pen"));
    }

    #[test]
    fn test_delete_reports_every_attribute_as_removed() {
        let change = EntityChange::deleted(item("Pen", 10, json!(3), "t1"));
        let diffs = DiffEngine.diff(&change, Operation::Delete, None);
        assert_eq!(diffs.len(), ITEM_FIELDS.len());
        assert!(diffs.iter().all(|d| d.new_value.is_null() && d.diff_type == DiffType::Removed));
        assert_eq!(diffs[3].old_value, json!(3));
    }

    #[test]
    fn test_update_reports_changed_scalars_and_timestamps() {
        let change = EntityChange::updated(
            item("Pen", 10, Value::Null, "t1"),
            item("Pen", 12, Value::Null, "t2"),
        )
        .unwrap();
        let diffs = DiffEngine.diff(&change, Operation::Update, None);
        let fields: Vec<_> = diffs.iter().map(|d| d.field).collect();
        assert_eq!(fields, vec!["quantity", "updated_at"]);
        assert_eq!(diffs[0].old_value, json!(10));
        assert_eq!(diffs[0].new_value, json!(12));
        assert_eq!(diffs[0].diff_type, DiffType::Changed);
    }

    #[test]
    fn test_update_of_identical_values_is_empty() {
        let change = EntityChange::updated(
            item("Pen", 10, Value::Null, "t1"),
            item("Pen", 10, Value::Null, "t1"),
        )
        .unwrap();
        assert!(DiffEngine.diff(&change, Operation::Update, None).is_empty());
    }

    #[test]
    fn test_update_touching_only_timestamps_is_empty() {
        let change = EntityChange::updated(
            item("Pen", 10, Value::Null, "t1"),
            item("Pen", 10, Value::Null, "t2"),
        )
        .unwrap();
        assert!(DiffEngine.diff(&change, Operation::Update, None).is_empty());
    }

    #[test]
    fn test_update_excludes_relation_fields() {
        let change = EntityChange::updated(
            item("Pen", 10, Value::Null, "t1"),
            item("Pen", 10, json!(4), "t2"),
        )
        .unwrap();
        assert!(DiffEngine.diff(&change, Operation::Update, None).is_empty());
    }

    #[test]
    fn test_join_row_link_reports_each_foreign_key() {
        let change = EntityChange::created(user_role(3, 9));
        let diffs = DiffEngine.diff(&change, Operation::Link, None);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].field, "user_id");
        assert_eq!(diffs[0].old_value, Value::Null);
        assert_eq!(diffs[0].new_value, json!(3));
        assert_eq!(diffs[1].new_value, json!(9));
        assert!(diffs.iter().all(|d| d.diff_type == DiffType::Added));
    }

    #[test]
    fn test_join_row_unlink_reverses_values() {
        let change = EntityChange::deleted(user_role(3, 9));
        let diffs = DiffEngine.diff(&change, Operation::Unlink, None);
        assert_eq!(diffs[1].old_value, json!(9));
        assert_eq!(diffs[1].new_value, Value::Null);
        assert!(diffs.iter().all(|d| d.diff_type == DiffType::Removed));
    }

    #[test]
    fn test_business_link_is_single_relation_diff() {
        let change = EntityChange::updated(
            item("Pen", 10, json!(2), "t1"),
            item("Pen", 10, json!(4), "t2"),
        )
        .unwrap();
        let relation = RelationRef::new(&ITEM_FIELDS[3]);
        let diffs = DiffEngine.diff(&change, Operation::Link, Some(&relation));
        assert_eq!(
            diffs,
            vec![FieldDiff {
                field: "category_id",
                old_value: json!(2),
                new_value: json!(4),
                diff_type: DiffType::Added,
            }]
        );
    }

    #[test]
    fn test_business_unlink_records_previous_value() {
        let change = EntityChange::updated(
            item("Pen", 10, json!(2), "t1"),
            item("Pen", 10, Value::Null, "t2"),
        )
        .unwrap();
        let relation = RelationRef::new(&ITEM_FIELDS[3]);
        let diffs = DiffEngine.diff(&change, Operation::Unlink, Some(&relation));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].old_value, json!(2));
        assert_eq!(diffs[0].new_value, Value::Null);
        assert_eq!(diffs[0].diff_type, DiffType::Removed);
    }
}
