//! Field descriptors declared by each tracked model.

use super::model_name::ModelName;

/// What role an attribute plays in its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// An ordinary business attribute (including the primary key).
    Scalar,
    /// A foreign key referencing another tracked model.
    Relation(ModelName),
    /// Bookkeeping timestamp maintained by the persistence layer.
    Timestamp,
}

/// A declared attribute of a tracked model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Column / attribute name.
    pub name: &'static str,
    /// Role of the attribute.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Declare a business attribute.
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    /// Declare a foreign key to `target`.
    pub const fn relation(name: &'static str, target: ModelName) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(target),
        }
    }

    /// Declare a bookkeeping timestamp.
    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Timestamp,
        }
    }

    /// Whether this attribute is a foreign key.
    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation(_))
    }

    /// Whether this attribute is bookkeeping metadata.
    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, FieldKind::Timestamp)
    }

    /// Whether this attribute is a business attribute.
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar)
    }

    /// The referenced model, for foreign keys.
    pub fn relation_target(&self) -> Option<ModelName> {
        match self.kind {
            FieldKind::Relation(target) => Some(target),
            _ => None,
        }
    }
}

/// How the persistence layer removes rows of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    /// Stamp `deleted_at` and hide the row from reads.
    Soft,
    /// Remove the row.
    Hard,
}

impl DeletionMode {
    /// Whether rows are kept with a deletion timestamp.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft)
    }
}
