use std::path::PathBuf;

/// Library-level structured errors for the stager.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to render config template")]
	ConfigRenderError {
		#[source]
		source: toml::ser::Error,
	},

	#[error("Invalid file pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: glob::PatternError,
	},

	#[error("Empty find string in {table} rewrite table")]
	EmptyRewriteFind { table: String },

	#[error(
		"Rewrite in {table} table is not idempotent: replacement {replace:?} contains {find:?}, which no later rule consumes"
	)]
	RewriteNotIdempotent {
		table: String,
		find: String,
		replace: String,
	},

	#[error("Search root not found: {path}")]
	SearchRootNotFound { path: PathBuf },

	#[error("Failed to walk directory: {path}")]
	WalkFailed {
		path: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("Failed to read: {path}")]
	ReadFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write: {path}")]
	WriteFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to copy {from} to {to}")]
	CopyFailed {
		from: PathBuf,
		to: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to create directory: {path}")]
	CreateDirFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to rename {from} to {to}")]
	RenameFailed {
		from: PathBuf,
		to: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Rename source does not exist: {path}")]
	RenameSourceMissing { path: PathBuf },

	#[error("No {name} found under {search_root}")]
	SpecialArtifactNotFound { name: String, search_root: PathBuf },

	#[error("Path has no file name: {path}")]
	NoFileName { path: PathBuf },
}

/// Result type alias using StageError.
pub type Result<T> = std::result::Result<T, StageError>;
