//! Inventory item entities.

pub mod model;
pub mod unit;

pub use model::{CreateItem, Item, UpdateItem};
pub use unit::UnitType;
