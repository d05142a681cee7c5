//! Change-log association columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stockroom_core::error::AppError;

/// A foreign-key column on `change_logs` pointing at the affected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    /// `item_id`
    Item,
    /// `category_id`
    Category,
    /// `department_id`
    Department,
    /// `role_id`
    Role,
    /// `permission_id`
    Permission,
    /// `user_id`
    User,
}

impl Association {
    /// All association columns.
    pub const ALL: [Association; 6] = [
        Self::Item,
        Self::Category,
        Self::Department,
        Self::Role,
        Self::Permission,
        Self::User,
    ];

    /// The column name on `change_logs`.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Item => "item_id",
            Self::Category => "category_id",
            Self::Department => "department_id",
            Self::Role => "role_id",
            Self::Permission => "permission_id",
            Self::User => "user_id",
        }
    }

    /// The entity name this column refers to.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Category => "category",
            Self::Department => "department",
            Self::Role => "role",
            Self::Permission => "permission",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for Association {
    type Err = AppError;

    /// Accepts either the entity name (`item`) or the column (`item_id`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.entity() == lowered || a.column() == lowered)
            .ok_or_else(|| {
                AppError::unknown_association(format!(
                    "Unknown change-log association '{s}'"
                ))
            })
    }
}

/// The association columns of one change-log row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChangeLogAssociations {
    /// Affected item.
    pub item_id: Option<i64>,
    /// Affected category.
    pub category_id: Option<i64>,
    /// Affected department.
    pub department_id: Option<i64>,
    /// Affected role.
    pub role_id: Option<i64>,
    /// Affected permission.
    pub permission_id: Option<i64>,
    /// Affected user.
    pub user_id: Option<i64>,
}

impl ChangeLogAssociations {
    /// Associations with a single column set.
    pub fn single(association: Association, id: i64) -> Self {
        let mut associations = Self::default();
        associations.set(association, id);
        associations
    }

    /// Set one column.
    pub fn set(&mut self, association: Association, id: i64) {
        *self.slot(association) = Some(id);
    }

    /// Read one column.
    pub fn get(&self, association: Association) -> Option<i64> {
        match association {
            Association::Item => self.item_id,
            Association::Category => self.category_id,
            Association::Department => self.department_id,
            Association::Role => self.role_id,
            Association::Permission => self.permission_id,
            Association::User => self.user_id,
        }
    }

    /// Whether no column is set.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterate over the columns that are set.
    pub fn iter(&self) -> impl Iterator<Item = (Association, i64)> + '_ {
        Association::ALL
            .into_iter()
            .filter_map(|a| self.get(a).map(|id| (a, id)))
    }

    fn slot(&mut self, association: Association) -> &mut Option<i64> {
        match association {
            Association::Item => &mut self.item_id,
            Association::Category => &mut self.category_id,
            Association::Department => &mut self.department_id,
            Association::Role => &mut self.role_id,
            Association::Permission => &mut self.permission_id,
            Association::User => &mut self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::error::ErrorKind;

    #[test]
    fn test_parse_entity_or_column() {
        assert_eq!("item".parse::<Association>().unwrap(), Association::Item);
        assert_eq!("ROLE_ID".parse::<Association>().unwrap(), Association::Role);
        let err = "warehouse".parse::<Association>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownAssociation);
    }

    #[test]
    fn test_associations_set_and_iter() {
        let mut assoc = ChangeLogAssociations::default();
        assert!(assoc.is_empty());
        assoc.set(Association::User, 3);
        assoc.set(Association::Role, 9);
        assert!(!assoc.is_empty());
        let set: Vec<_> = assoc.iter().collect();
        assert_eq!(set, vec![(Association::Role, 9), (Association::User, 3)]);
        assert_eq!(ChangeLogAssociations::single(Association::Item, 1).item_id, Some(1));
    }
}
