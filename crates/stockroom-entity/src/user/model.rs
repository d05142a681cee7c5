//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::tracked::{DeletionMode, FieldDescriptor, ModelName, Tracked};

/// An application user.
///
/// The password hash is serialized so that snapshots capture it; the
/// change-log read path masks it for untrusted viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Pre-computed password hash.
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Tracked for User {
    const MODEL: ModelName = ModelName::User;
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("username"),
        FieldDescriptor::scalar("password_hash"),
        FieldDescriptor::timestamp("created_at"),
        FieldDescriptor::timestamp("updated_at"),
    ];
    const DELETION: DeletionMode = DeletionMode::Hard;

    fn primary_id(&self) -> i64 {
        self.id
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// Data for updating an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New username.
    pub username: Option<String>,
    /// New pre-hashed password.
    pub password_hash: Option<String>,
}
