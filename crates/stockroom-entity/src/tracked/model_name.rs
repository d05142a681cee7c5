//! Names of every tracked model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::error::AppError;

use crate::change_log::Association;

/// Every model whose mutations are change-logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    /// Inventory item.
    Item,
    /// Item category.
    Category,
    /// Owning department.
    Department,
    /// Access role.
    Role,
    /// Named permission.
    Permission,
    /// Application user.
    User,
    /// User ↔ role join row.
    UserRole,
    /// Role ↔ permission join row.
    RolePermission,
}

impl ModelName {
    /// The change-log association column this model maps to.
    ///
    /// Join-table models have none: their rows set one column per
    /// foreign key instead.
    pub fn association(&self) -> Option<Association> {
        match self {
            Self::Item => Some(Association::Item),
            Self::Category => Some(Association::Category),
            Self::Department => Some(Association::Department),
            Self::Role => Some(Association::Role),
            Self::Permission => Some(Association::Permission),
            Self::User => Some(Association::User),
            Self::UserRole | Self::RolePermission => None,
        }
    }

    /// Return the model name as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Category => "category",
            Self::Department => "department",
            Self::Role => "role",
            Self::Permission => "permission",
            Self::User => "user",
            Self::UserRole => "user_role",
            Self::RolePermission => "role_permission",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "item" => Ok(Self::Item),
            "category" => Ok(Self::Category),
            "department" => Ok(Self::Department),
            "role" => Ok(Self::Role),
            "permission" => Ok(Self::Permission),
            "user" => Ok(Self::User),
            "user_role" => Ok(Self::UserRole),
            "role_permission" => Ok(Self::RolePermission),
            _ => Err(AppError::unknown_association(format!(
                "Unknown model '{s}'"
            ))),
        }
    }
}
