//! Change-log row models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use stockroom_core::error::AppError;

use super::actor::ActorId;
use super::association::ChangeLogAssociations;
use super::operation::{DiffType, Operation};

/// An immutable change-log row recording one mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChangeLog {
    /// Unique change-log identifier.
    pub id: i64,
    /// The logged operation.
    pub operation: Operation,
    /// Free-form payload (relation name / related id for link and unlink).
    pub change_details: Option<Value>,
    /// When the change was recorded.
    pub changed_at: DateTime<Utc>,
    /// The user the change is attributed to.
    pub changed_by: ActorId,
    /// Rows affected by the change; at least one is set.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub associations: ChangeLogAssociations,
}

/// One field-level difference belonging to a [`ChangeLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChangeLogDetail {
    /// Unique detail identifier.
    pub id: i64,
    /// Owning change-log row.
    pub change_log_id: i64,
    /// Changed attribute or foreign-key name.
    pub field: String,
    /// Value before the change.
    pub old_value: Option<Value>,
    /// Value after the change.
    pub new_value: Option<Value>,
    /// Classification derived from the owning operation.
    pub diff_type: DiffType,
    /// Optional annotation.
    pub metadata: Option<Value>,
    /// When the detail was written.
    pub created_at: DateTime<Utc>,
}

/// A change-log row together with its details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// The change-log row.
    #[serde(flatten)]
    pub change_log: ChangeLog,
    /// Its field-level details.
    pub details: Vec<ChangeLogDetail>,
}

/// Data required to create a change-log row.
///
/// Construction enforces that at least one association is set.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChangeLog {
    operation: Operation,
    changed_by: ActorId,
    changed_at: DateTime<Utc>,
    associations: ChangeLogAssociations,
    change_details: Option<Value>,
}

impl NewChangeLog {
    /// Validate and build a change-log row stamped with the current time.
    pub fn new(
        operation: Operation,
        changed_by: ActorId,
        associations: ChangeLogAssociations,
        change_details: Option<Value>,
    ) -> Result<Self, AppError> {
        if associations.is_empty() {
            return Err(AppError::invariant_violation(
                "ChangeLog: At least one association must be set.",
            ));
        }
        Ok(Self {
            operation,
            changed_by,
            changed_at: Utc::now(),
            associations,
            change_details,
        })
    }

    /// The logged operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The acting user.
    pub fn changed_by(&self) -> ActorId {
        self.changed_by
    }

    /// When the change was recorded.
    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// The association columns to set.
    pub fn associations(&self) -> &ChangeLogAssociations {
        &self.associations
    }

    /// Free-form payload.
    pub fn change_details(&self) -> Option<&Value> {
        self.change_details.as_ref()
    }
}

/// Data required to create a change-log detail row.
///
/// The diff type is always derived from the owning operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChangeLogDetail {
    change_log_id: i64,
    field: String,
    old_value: Value,
    new_value: Value,
    diff_type: DiffType,
    metadata: Option<Value>,
}

impl NewChangeLogDetail {
    /// Build a detail for `operation`.
    pub fn new(
        change_log_id: i64,
        operation: Operation,
        field: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            change_log_id,
            field: field.into(),
            old_value,
            new_value,
            diff_type: operation.diff_type(),
            metadata: None,
        }
    }

    /// Owning change-log row.
    pub fn change_log_id(&self) -> i64 {
        self.change_log_id
    }

    /// Changed attribute name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Value before the change; `None` when null.
    pub fn old_value(&self) -> Option<&Value> {
        non_null(&self.old_value)
    }

    /// Value after the change; `None` when null.
    pub fn new_value(&self) -> Option<&Value> {
        non_null(&self.new_value)
    }

    /// Derived classification.
    pub fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    /// Optional annotation.
    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }
}

fn non_null(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_log::Association;
    use serde_json::json;
    use stockroom_core::error::ErrorKind;

    #[test]
    fn test_new_change_log_requires_association() {
        let err = NewChangeLog::new(
            Operation::Create,
            ActorId::SYSTEM,
            ChangeLogAssociations::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvariantViolation);

        let ok = NewChangeLog::new(
            Operation::Create,
            ActorId::SYSTEM,
            ChangeLogAssociations::single(Association::Item, 5),
            None,
        )
        .expect("one association is enough");
        assert_eq!(ok.associations().item_id, Some(5));
    }

    #[test]
    fn test_detail_diff_type_follows_operation() {
        let detail = NewChangeLogDetail::new(1, Operation::Unlink, "role_id", json!(4), Value::Null);
        assert_eq!(detail.diff_type(), DiffType::Removed);
        assert_eq!(detail.old_value(), Some(&json!(4)));
        assert_eq!(detail.new_value(), None);
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = ChangeLogEntry {
            change_log: ChangeLog {
                id: 1,
                operation: Operation::Create,
                change_details: None,
                changed_at: Utc::now(),
                changed_by: ActorId::new(7).unwrap(),
                associations: ChangeLogAssociations::single(Association::Item, 3),
            },
            details: Vec::new(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["item_id"], 3);
        assert_eq!(json["changed_by"], 7);
        assert_eq!(json["operation"], "create");
        assert!(json["details"].as_array().unwrap().is_empty());
    }
}
