//! Permission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// A named capability granted through roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: i64,
    /// Unique permission name, e.g. `create_item`.
    pub name: String,
    /// What the permission allows.
    pub description: String,
    /// Set when the permission has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tracked for Permission {
    const MODEL: ModelName = ModelName::Permission;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::scalar("description"),
        FieldDescriptor::timestamp("deleted_at"),
    ];
    const DELETION: DeletionMode = DeletionMode::Soft;

    fn primary_id(&self) -> i64 {
        self.id
    }
}

/// Data required to create a new permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    /// Permission name.
    pub name: String,
    /// What the permission allows.
    pub description: String,
}

/// Data for updating a permission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePermission {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}
