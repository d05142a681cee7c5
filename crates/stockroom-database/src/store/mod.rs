//! Storage seam for change-log rows.
//!
//! The change-log writer never opens its own connection. Every mutation
//! path hands it the handle its own writes go through, normally the open
//! transaction (`&mut *tx`), so audit rows commit or roll back together
//! with the mutation they describe.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use stockroom_core::result::AppResult;
use stockroom_entity::change_log::{ChangeLog, ChangeLogDetail, NewChangeLog, NewChangeLogDetail};

pub use memory::{MemoryChangeLogStore, MemoryTransaction};

/// Append-only sink for change-log rows.
#[async_trait]
pub trait ChangeLogStore: Send {
    /// Insert a change-log row and return it with its generated id.
    async fn insert_change_log(&mut self, row: &NewChangeLog) -> AppResult<ChangeLog>;

    /// Insert one detail row.
    ///
    /// A failure must leave earlier rows written through this handle
    /// intact and the handle usable.
    async fn insert_detail(&mut self, row: &NewChangeLogDetail) -> AppResult<ChangeLogDetail>;
}
