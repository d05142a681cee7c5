//! User ↔ role assignment.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// One role assigned to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    /// The user.
    pub user_id: i64,
    /// The assigned role.
    pub role_id: i64,
}

impl UserRole {
    /// Pair a user with a role.
    pub fn new(user_id: i64, role_id: i64) -> Self {
        Self { user_id, role_id }
    }
}

impl Tracked for UserRole {
    const MODEL: ModelName = ModelName::UserRole;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::relation("user_id", ModelName::User),
        FieldDescriptor::relation("role_id", ModelName::Role),
    ];
    const DELETION: DeletionMode = DeletionMode::Hard;

    /// Join rows have no surrogate key; the owning user stands in.
    fn primary_id(&self) -> i64 {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_role_is_join_row() {
        let snap = UserRole::new(3, 9).snapshot().expect("capture");
        assert!(snap.is_join_row());
        assert_eq!(snap.get("role_id"), Some(&json!(9)));
    }
}
