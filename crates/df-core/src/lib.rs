//! df-core: stable foundation for the dataflow descriptor workspace.
//!
//! Contains:
//! - ids (stable compact IDs for nodes, ports and links)
//! - name (identifier rules shared by the builder and application files)

pub mod ids;
pub mod name;

// Re-exports: nice ergonomics for downstream crates
pub use ids::*;
pub use name::{NameError, check_name};
