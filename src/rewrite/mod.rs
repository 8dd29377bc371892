//! Literal include-path rewriting for staged sources.
//!
//! This module handles:
//! - Ordered find/replace tables
//! - In-place and copy-through file rewrites with atomic replacement

pub mod table;
pub mod writer;

pub use table::RewriteTable;
pub use writer::{rewrite_file, rewrite_into, write_atomic};
