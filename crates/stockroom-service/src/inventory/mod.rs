//! Inventory services: items and the categories and departments they belong to.

pub mod category;
pub mod department;
pub mod item;

pub use category::CategoryService;
pub use department::DepartmentService;
pub use item::ItemService;
