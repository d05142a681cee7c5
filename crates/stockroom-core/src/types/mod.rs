//! Core type definitions used across the Stockroom workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
