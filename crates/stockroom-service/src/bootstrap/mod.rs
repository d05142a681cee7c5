//! First-run seeding.

pub mod admin;

pub use admin::{BootstrapReport, BootstrapService};
