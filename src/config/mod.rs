//! Configuration loading and parsing for the stager.
//!
//! This module handles:
//! - TOML config file parsing and validation
//! - Config discovery (explicit path, working directory, built-in defaults)
//! - The `--init` template

pub mod discover;
pub mod parser;
pub mod types;

pub use discover::{CONFIG_FILE_NAME, discover_config, init_template};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{LoadedConfig, RenameRule, RewriteRule, StageConfig};
