use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, StageConfig};
use crate::error::{Result, StageError};
use std::path::Path;

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = ".cxx-stage.toml";

/// Find and load the effective configuration.
///
/// The lookup order is:
/// 1. `explicit`, if given; it must exist
/// 2. `.cxx-stage.toml` in `start_dir`
/// 3. Built-in defaults
pub fn discover_config(start_dir: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
	if let Some(path) = explicit {
		if !path.exists() {
			return Err(StageError::ConfigNotFound {
				path: path.to_path_buf(),
			});
		}
		return Ok(LoadedConfig {
			config: parse_config_file(path)?,
			path: Some(path.to_path_buf()),
		});
	}

	let local = start_dir.join(CONFIG_FILE_NAME);
	if local.exists() {
		return Ok(LoadedConfig {
			config: parse_config_file(&local)?,
			path: Some(local),
		});
	}

	Ok(LoadedConfig {
		config: StageConfig::default(),
		path: None,
	})
}

/// A commented config template holding the built-in defaults.
pub fn init_template() -> Result<String> {
	let defaults = toml::to_string_pretty(&StageConfig::default())
		.map_err(|source| StageError::ConfigRenderError { source })?;
	Ok(format!(
		"# cxx-stage configuration\n\
		 #\n\
		 # Relative paths resolve against the directory cxx-stage runs in.\n\
		 # Remove any key to fall back to its built-in default.\n\
		 #\n\
		 # A `replace` must not contain its own `find` or that of an earlier\n\
		 # rule in the same table, so staging twice leaves the output unchanged.\n\
		 \n\
		 {defaults}"
	))
}
