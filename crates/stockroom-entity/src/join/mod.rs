//! Many-to-many join rows.
//!
//! These rows carry only foreign keys. Creating one is logged as a `link`
//! and removing one as an `unlink`, with every foreign key set on the
//! change-log row.

pub mod role_permission;
pub mod user_role;

pub use role_permission::RolePermission;
pub use user_role::UserRole;
