//! Change-log (audit trail) entities.

pub mod actor;
pub mod association;
pub mod model;
pub mod operation;

pub use actor::ActorId;
pub use association::{Association, ChangeLogAssociations};
pub use model::{ChangeLog, ChangeLogDetail, ChangeLogEntry, NewChangeLog, NewChangeLogDetail};
pub use operation::{DiffType, Operation};
