//! # stockroom-service
//!
//! Business logic for Stockroom. Entity services run each mutation in a
//! transaction and hand the before/after state to the change-log hooks,
//! so the audit rows commit or roll back together with the change.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod access;
pub mod bootstrap;
pub mod change_log;
pub mod context;
pub mod inventory;
pub mod services;

mod validate;

pub use access::{PermissionService, RoleService, UserService};
pub use bootstrap::{BootstrapReport, BootstrapService};
pub use change_log::{
    ChangeLogQueryService, ChangeLogReport, ChangeLogWriter, EntityHookAdapter, Viewer,
};
pub use context::MutationOptions;
pub use inventory::{CategoryService, DepartmentService, ItemService};
pub use services::Services;
