//! Role ↔ permission grant.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// One permission granted to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    /// The role.
    pub role_id: i64,
    /// The granted permission.
    pub permission_id: i64,
}

impl RolePermission {
    /// Pair a role with a permission.
    pub fn new(role_id: i64, permission_id: i64) -> Self {
        Self {
            role_id,
            permission_id,
        }
    }
}

impl Tracked for RolePermission {
    const MODEL: ModelName = ModelName::RolePermission;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::relation("role_id", ModelName::Role),
        FieldDescriptor::relation("permission_id", ModelName::Permission),
    ];
    const DELETION: DeletionMode = DeletionMode::Hard;

    fn primary_id(&self) -> i64 {
        self.role_id
    }
}
