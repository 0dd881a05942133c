//! CLI command handlers
//!
//! `lifecycle` drives the mutating workflows, `list` the read-only inventory.

pub mod lifecycle;
pub mod list;
