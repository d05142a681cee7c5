//! Per-call options carried by every mutation.

use serde::{Deserialize, Serialize};

/// Options a caller passes with a mutation.
///
/// Passing no options at all marks the call as internal; such calls are
/// not change-logged. Passing options without an actor is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOptions {
    /// The user performing the mutation.
    pub actor_id: Option<i64>,
}

impl MutationOptions {
    /// Options attributing the mutation to `actor_id`.
    pub fn actor(actor_id: i64) -> Self {
        Self {
            actor_id: Some(actor_id),
        }
    }

    /// Options attributing the mutation to the bootstrap/system actor.
    pub fn system() -> Self {
        Self::actor(0)
    }
}
