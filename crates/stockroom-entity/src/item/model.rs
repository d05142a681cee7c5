//! Item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

use super::unit::UnitType;

/// A stocked inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    /// Unique item identifier.
    pub id: i64,
    /// Unique item name.
    pub name: String,
    /// Quantity on hand (at least 1).
    pub quantity: i32,
    /// Unit the quantity is counted in.
    pub unit: UnitType,
    /// Optional category.
    pub category_id: Option<i64>,
    /// Owning department.
    pub department_id: i64,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
    /// Set when the item has been soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tracked for Item {
    const MODEL: ModelName = ModelName::Item;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::scalar("quantity"),
        FieldDescriptor::scalar("unit"),
        FieldDescriptor::relation("category_id", ModelName::Category),
        FieldDescriptor::relation("department_id", ModelName::Department),
        FieldDescriptor::timestamp("created_at"),
        FieldDescriptor::timestamp("updated_at"),
        FieldDescriptor::timestamp("deleted_at"),
    ];
    const DELETION: DeletionMode = DeletionMode::Soft;

    fn primary_id(&self) -> i64 {
        self.id
    }
}

/// Data required to create a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    /// Item name.
    pub name: String,
    /// Initial quantity.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Measurement unit.
    #[serde(default)]
    pub unit: UnitType,
    /// Optional category.
    pub category_id: Option<i64>,
    /// Owning department.
    pub department_id: i64,
}

/// Data for updating an existing item.
///
/// `None` leaves a column untouched. `category_id: Some(None)` clears the
/// category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// New name.
    pub name: Option<String>,
    /// New quantity.
    pub quantity: Option<i32>,
    /// New unit.
    pub unit: Option<UnitType>,
    /// New category, or `Some(None)` to clear it.
    pub category_id: Option<Option<i64>>,
    /// New owning department.
    pub department_id: Option<i64>,
}

fn default_quantity() -> i32 {
    1
}
