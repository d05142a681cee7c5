//! Logged operation kinds and their fixed diff classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::error::AppError;

/// The kind of mutation a change-log row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "change_operation", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A row was inserted.
    Create,
    /// Business attributes of a row changed.
    Update,
    /// A row was removed.
    Delete,
    /// A relation was associated.
    Link,
    /// A relation was dissociated.
    Unlink,
}

/// Classification of a single field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "diff_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    /// The value did not exist before.
    Added,
    /// The value was replaced.
    Changed,
    /// The value no longer exists.
    Removed,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Operation; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Link,
        Self::Unlink,
    ];

    /// The diff type every detail of this operation carries.
    pub fn diff_type(&self) -> DiffType {
        match self {
            Self::Create | Self::Link => DiffType::Added,
            Self::Update => DiffType::Changed,
            Self::Delete | Self::Unlink => DiffType::Removed,
        }
    }

    /// Whether this operation associates or dissociates a relation.
    pub fn is_relational(&self) -> bool {
        matches!(self, Self::Link | Self::Unlink)
    }

    /// Return the operation as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Link => "link",
            Self::Unlink => "unlink",
        }
    }
}

impl DiffType {
    /// Return the diff type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "link" => Ok(Self::Link),
            "unlink" => Ok(Self::Unlink),
            _ => Err(AppError::validation(format!(
                "Invalid operation: '{s}'. Expected one of: create, update, delete, link, unlink"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_type_mapping() {
        assert_eq!(Operation::Create.diff_type(), DiffType::Added);
        assert_eq!(Operation::Link.diff_type(), DiffType::Added);
        assert_eq!(Operation::Update.diff_type(), DiffType::Changed);
        assert_eq!(Operation::Delete.diff_type(), DiffType::Removed);
        assert_eq!(Operation::Unlink.diff_type(), DiffType::Removed);
    }

    #[test]
    fn test_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("upsert".parse::<Operation>().is_err());
    }
}
