//! # stockroom-database
//!
//! PostgreSQL connection management, migrations, entity repositories and
//! the storage seam the change-log writer persists through.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ChangeLogStore, MemoryChangeLogStore};
