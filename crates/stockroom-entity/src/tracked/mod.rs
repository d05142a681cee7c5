//! Tracked entities: declared field schemas and point-in-time snapshots.
//!
//! Every audited table row implements [`Tracked`]. The change-log
//! subsystem never inspects entity structs directly; it works on
//! [`Snapshot`]s captured before and after a mutation.

pub mod descriptor;
pub mod model_name;
pub mod snapshot;

use serde::Serialize;

use stockroom_core::result::AppResult;

pub use descriptor::{DeletionMode, FieldDescriptor, FieldKind};
pub use model_name::ModelName;
pub use snapshot::{EntityChange, Snapshot};

/// A table row whose mutations are recorded in the change log.
pub trait Tracked: Serialize {
    /// The model this row belongs to.
    const MODEL: ModelName;
    /// Declared attributes, in the order they are reported.
    const FIELDS: &'static [FieldDescriptor];
    /// How rows of this model are removed.
    const DELETION: DeletionMode;

    /// The id recorded on the change-log association column.
    fn primary_id(&self) -> i64;

    /// Capture the current attribute values.
    fn snapshot(&self) -> AppResult<Snapshot>
    where
        Self: Sized,
    {
        Snapshot::capture(self)
    }
}
