//! Point-in-time attribute captures and before/after change pairs.

use serde_json::Value;

use stockroom_core::error::AppError;
use stockroom_core::result::AppResult;

use super::descriptor::FieldDescriptor;
use super::model_name::ModelName;
use super::Tracked;

static NULL: Value = Value::Null;

/// Attribute values of one row, in declared field order.
///
/// Values are normalized through `serde_json`, so timestamps compare as
/// UTC instants and numbers compare by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    model: ModelName,
    id: i64,
    fields: &'static [FieldDescriptor],
    values: Vec<Value>,
}

impl Snapshot {
    /// Capture a tracked row.
    pub fn capture<T: Tracked>(entity: &T) -> AppResult<Self> {
        let Value::Object(mut map) = serde_json::to_value(entity)? else {
            return Err(AppError::internal(format!(
                "{} did not serialize to an object",
                T::MODEL
            )));
        };

        let values = T::FIELDS
            .iter()
            .map(|field| map.remove(field.name).unwrap_or(Value::Null))
            .collect();

        Ok(Self {
            model: T::MODEL,
            id: entity.primary_id(),
            fields: T::FIELDS,
            values,
        })
    }

    /// Build a snapshot from explicit values.
    ///
    /// `values` must line up with `fields`.
    pub fn from_values(
        model: ModelName,
        id: i64,
        fields: &'static [FieldDescriptor],
        values: Vec<Value>,
    ) -> AppResult<Self> {
        if fields.len() != values.len() {
            return Err(AppError::internal(format!(
                "{model} snapshot has {} values for {} fields",
                values.len(),
                fields.len()
            )));
        }
        Ok(Self {
            model,
            id,
            fields,
            values,
        })
    }

    /// The model this row belongs to.
    pub fn model(&self) -> ModelName {
        self.model
    }

    /// The row's primary id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The declared fields of the row's model.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|idx| &self.values[idx])
    }

    /// Iterate over `(field, value)` pairs in declared order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Value)> + '_ {
        self.fields.iter().zip(self.values.iter())
    }

    /// Iterate over foreign-key attributes only.
    pub fn relations(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Value)> + '_ {
        self.attributes().filter(|(f, _)| f.is_relation())
    }

    /// Whether this row is a pure many-to-many join record.
    ///
    /// A join row carries at least two foreign keys, optional timestamps,
    /// and no business attributes.
    pub fn is_join_row(&self) -> bool {
        self.fields.iter().all(|f| !f.is_scalar())
            && self.fields.iter().filter(|f| f.is_relation()).count() >= 2
    }
}

/// The state of one row before and after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChange {
    sides: Sides,
}

#[derive(Debug, Clone, PartialEq)]
enum Sides {
    Created(Snapshot),
    Updated(Snapshot, Snapshot),
    Deleted(Snapshot),
}

impl EntityChange {
    /// A row that was inserted.
    pub fn created(after: Snapshot) -> Self {
        Self {
            sides: Sides::Created(after),
        }
    }

    /// A row that was modified in place.
    pub fn updated(before: Snapshot, after: Snapshot) -> AppResult<Self> {
        if before.model != after.model || before.id != after.id {
            return Err(AppError::internal(format!(
                "Cannot pair {} {} with {} {}",
                before.model, before.id, after.model, after.id
            )));
        }
        Ok(Self {
            sides: Sides::Updated(before, after),
        })
    }

    /// A row that was removed.
    pub fn deleted(before: Snapshot) -> Self {
        Self {
            sides: Sides::Deleted(before),
        }
    }

    /// State prior to the mutation, if the row existed.
    pub fn before(&self) -> Option<&Snapshot> {
        match &self.sides {
            Sides::Created(_) => None,
            Sides::Updated(before, _) | Sides::Deleted(before) => Some(before),
        }
    }

    /// State after the mutation, if the row still exists.
    pub fn after(&self) -> Option<&Snapshot> {
        match &self.sides {
            Sides::Created(after) | Sides::Updated(_, after) => Some(after),
            Sides::Deleted(_) => None,
        }
    }

    /// The most recent known state of the row.
    pub fn current(&self) -> &Snapshot {
        match &self.sides {
            Sides::Created(after) | Sides::Updated(_, after) => after,
            Sides::Deleted(before) => before,
        }
    }

    /// The row's model.
    pub fn model(&self) -> ModelName {
        self.current().model
    }

    /// The row's primary id.
    pub fn id(&self) -> i64 {
        self.current().id
    }

    /// Value of `field` before the mutation (null when unknown).
    pub fn previous(&self, field: &str) -> &Value {
        self.before()
            .and_then(|s| s.get(field))
            .unwrap_or(&NULL)
    }

    /// Value of `field` after the mutation (null when removed).
    pub fn value(&self, field: &str) -> &Value {
        self.after()
            .and_then(|s| s.get(field))
            .unwrap_or(&NULL)
    }

    /// Fields whose value differs between the two sides.
    ///
    /// Empty unless both sides are present.
    pub fn changed_fields(&self) -> Vec<&'static FieldDescriptor> {
        let Sides::Updated(before, after) = &self.sides else {
            return Vec::new();
        };
        before
            .attributes()
            .filter(|(field, old)| after.get(field.name) != Some(*old))
            .map(|(field, _)| field)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::relation("category_id", ModelName::Category),
        FieldDescriptor::timestamp("updated_at"),
    ];

    const JOIN_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::relation("user_id", ModelName::User),
        FieldDescriptor::relation("role_id", ModelName::Role),
    ];

    fn item(name: &str, category: Value) -> Snapshot {
        Snapshot::from_values(
            ModelName::Item,
            1,
            FIELDS,
            vec![json!(1), json!(name), category, json!("2024-01-01T00:00:00Z")],
        )
        .expect("aligned values")
    }

    #[test]
    fn test_get_and_relations() {
        let snap = item("Pen", json!(4));
        assert_eq!(snap.get("name"), Some(&json!("Pen")));
        assert_eq!(snap.get("missing"), None);
        let relations: Vec<_> = snap.relations().map(|(f, _)| f.name).collect();
        assert_eq!(relations, vec!["category_id"]);
        assert!(!snap.is_join_row());
    }

    #[test]
    fn test_join_row_detection() {
        let join = Snapshot::from_values(ModelName::UserRole, 3, JOIN_FIELDS, vec![json!(3), json!(9)])
            .expect("aligned values");
        assert!(join.is_join_row());
    }

    #[test]
    fn test_misaligned_values_rejected() {
        assert!(Snapshot::from_values(ModelName::Item, 1, FIELDS, vec![json!(1)]).is_err());
    }

    #[test]
    fn test_changed_fields_uses_value_equality() {
        let change = EntityChange::updated(item("Pen", Value::Null), item("Pen", Value::Null))
            .expect("same row");
        assert!(change.changed_fields().is_empty());

        let change = EntityChange::updated(item("Pen", Value::Null), item("Marker", json!(2)))
            .expect("same row");
        let changed: Vec<_> = change.changed_fields().iter().map(|f| f.name).collect();
        assert_eq!(changed, vec!["name", "category_id"]);
        assert_eq!(change.previous("name"), &json!("Pen"));
        assert_eq!(change.value("category_id"), &json!(2));
    }

    #[test]
    fn test_sides() {
        let deleted = EntityChange::deleted(item("Pen", Value::Null));
        assert!(deleted.after().is_none());
        assert_eq!(deleted.value("name"), &Value::Null);
        assert_eq!(deleted.current().get("name"), Some(&json!("Pen")));
        assert!(deleted.changed_fields().is_empty());
    }

    #[test]
    fn test_update_rejects_different_rows() {
        let other = Snapshot::from_values(
            ModelName::Category,
            1,
            FIELDS,
            vec![json!(1), json!("x"), Value::Null, Value::Null],
        )
        .expect("aligned values");
        assert!(EntityChange::updated(item("Pen", Value::Null), other).is_err());
    }
}
