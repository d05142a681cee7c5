//! Department entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// An organizational unit that owns items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: i64,
    /// Unique department name.
    pub name: String,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
    /// When the department was last updated.
    pub updated_at: DateTime<Utc>,
    /// Set when the department has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tracked for Department {
    const MODEL: ModelName = ModelName::Department;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::timestamp("created_at"),
        FieldDescriptor::timestamp("updated_at"),
        FieldDescriptor::timestamp("deleted_at"),
    ];
    const DELETION: DeletionMode = DeletionMode::Soft;

    fn primary_id(&self) -> i64 {
        self.id
    }
}

/// Data required to create a new department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    /// Department name.
    pub name: String,
}

/// Data for renaming a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDepartment {
    /// New name.
    pub name: Option<String>,
}
