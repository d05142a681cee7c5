//! Access role entities.

pub mod model;

pub use model::{CreateRole, Role, UpdateRole};
