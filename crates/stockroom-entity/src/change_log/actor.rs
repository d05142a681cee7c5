//! The user a mutation is attributed to.

use std::fmt;

use serde::{Deserialize, Serialize};

use stockroom_core::error::AppError;

/// Id of the user responsible for a mutation.
///
/// Zero is the bootstrap/system actor. Negative ids are never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    /// The bootstrap/system actor.
    pub const SYSTEM: ActorId = ActorId(0);

    /// Validate a raw actor id.
    pub fn new(id: i64) -> Result<Self, AppError> {
        if id < 0 {
            return Err(AppError::missing_actor(format!("Invalid actor id {id}")));
        }
        Ok(Self(id))
    }

    /// Validate an optional raw actor id.
    pub fn require(id: Option<i64>) -> Result<Self, AppError> {
        match id {
            Some(id) => Self::new(id),
            None => Err(AppError::missing_actor("userId required for changelog")),
        }
    }

    /// Return the raw id.
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Whether this is the bootstrap/system actor.
    pub fn is_system(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
