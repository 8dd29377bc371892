//! cxx-stager - stages cxx bridge output for a downstream C++ build.
//!
//! This library provides the core functionality for `cxx-stage`, including:
//! - Configuration file parsing and discovery
//! - Shell-pattern file collection
//! - Ordered literal include rewriting with atomic file replacement
//! - The staging jobs and their orchestration
//!
//! # Example
//!
//! ```no_run
//! use cxx_stager::config::discover_config;
//! use cxx_stager::stage::Stager;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let loaded = discover_config(&cwd, None).unwrap();
//! let report = Stager::new(loaded.config).run().unwrap();
//!
//! println!("staged {} libraries", report.libraries);
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod rewrite;
pub mod stage;

pub use error::{Result, StageError};
