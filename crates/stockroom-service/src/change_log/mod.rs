//! Change-log subsystem.
//!
//! A mutation fires a lifecycle event; [`EntityHookAdapter`] normalizes
//! it, [`ChangeLogWriter`] resolves the effective operation through
//! [`OperationInferencer`], asks [`DiffEngine`] for field diffs and
//! persists them through the caller's [`ChangeLogStore`] handle.
//!
//! [`ChangeLogStore`]: stockroom_database::ChangeLogStore

pub mod diff;
pub mod hooks;
pub mod inference;
pub mod query;
pub mod writer;

pub use diff::{DiffEngine, FieldDiff, RelationRef};
pub use hooks::{Affected, EntityHookAdapter, HookAction};
pub use inference::{OperationInferencer, PlannedEvent};
pub use query::{ChangeLogQueryService, Viewer};
pub use writer::{ChangeLogReport, ChangeLogWriter, DetailOutcome, DetailStatus, WriteRequest};
