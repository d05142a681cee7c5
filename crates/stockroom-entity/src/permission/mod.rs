//! Named permission entities.

pub mod model;

pub use model::{CreatePermission, Permission, UpdatePermission};
