//! # stockroom-entity
//!
//! Domain entity models for Stockroom. Every struct in this crate
//! represents a database table row or a domain value object. Tracked
//! entities implement [`tracked::Tracked`] so their mutations can be
//! captured as [`tracked::Snapshot`]s and written to the change log.

pub mod category;
pub mod change_log;
pub mod department;
pub mod item;
pub mod join;
pub mod permission;
pub mod role;
pub mod tracked;
pub mod user;
