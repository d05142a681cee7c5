//! Repository implementations for all Stockroom entities.
//!
//! Reads run against the pool. Writes take the caller's connection so that
//! they share the caller's transaction with the change-log rows.

pub mod category;
pub mod change_log;
pub mod department;
pub mod item;
pub mod permission;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_role;

pub use category::CategoryRepository;
pub use change_log::ChangeLogRepository;
pub use department::DepartmentRepository;
pub use item::ItemRepository;
pub use permission::PermissionRepository;
pub use role::RoleRepository;
pub use role_permission::RolePermissionRepository;
pub use user::UserRepository;
pub use user_role::UserRoleRepository;

use stockroom_core::error::{AppError, ErrorKind};

/// Map a write failure, reporting unique-key collisions as conflicts.
pub(crate) fn write_error(err: sqlx::Error, entity: &str, context: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::conflict(format!("{entity} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::validation(format!("{entity} references a missing row"));
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
