//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// A grouping of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: i64,
    /// Unique category name.
    pub name: String,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
    /// Set when the category has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tracked for Category {
    const MODEL: ModelName = ModelName::Category;
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

/// Data required to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name.
    pub name: String,
}

/// Data for renaming a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    /// New name.
    pub name: Option<String>,
}
