//! File collection by shell-style name pattern.
//!
//! Patterns match against the base name only, the way `fnmatch` does, so
//! `*.h` finds headers at any depth when the search is recursive.

use crate::error::{Result, StageError};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A pattern plus where and how deep to look for it.
#[derive(Debug, Clone)]
pub struct FilePattern {
	/// Pattern matched against each file's base name.
	pub pattern: Pattern,

	/// Directory to search.
	pub root: PathBuf,

	/// Whether to descend into subdirectories.
	pub recursive: bool,
}

impl FilePattern {
	pub fn new(pattern: &str, root: &Path, recursive: bool) -> Result<Self> {
		let pattern = Pattern::new(pattern).map_err(|source| StageError::InvalidPattern {
			pattern: pattern.to_string(),
			source,
		})?;

		Ok(FilePattern {
			pattern,
			root: root.to_path_buf(),
			recursive,
		})
	}

	/// Check a path's base name against the pattern.
	pub fn matches_name(&self, path: &Path) -> bool {
		path.file_name()
			.map(|name| self.pattern.matches(&name.to_string_lossy()))
			.unwrap_or(false)
	}
}

/// Collect the regular files under `rule.root` whose base name matches.
///
/// The result is sorted. An empty result is not an error; a missing root is.
pub fn collect_files(rule: &FilePattern) -> Result<Vec<PathBuf>> {
	if !rule.root.is_dir() {
		return Err(StageError::SearchRootNotFound {
			path: rule.root.clone(),
		});
	}

	let mut files = if rule.recursive {
		walk_matching(rule)?
	} else {
		list_matching(rule)?
	};
	files.sort();

	debug!(
		pattern = rule.pattern.as_str(),
		root = %rule.root.display(),
		count = files.len(),
		"collected files"
	);
	Ok(files)
}

/// Collect files matching any of `patterns`, without duplicates.
pub fn collect_all(patterns: &[String], root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	for pattern in patterns {
		let rule = FilePattern::new(pattern, root, recursive)?;
		files.extend(collect_files(&rule)?);
	}
	files.sort();
	files.dedup();
	Ok(files)
}

fn walk_matching(rule: &FilePattern) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	for entry in WalkDir::new(&rule.root) {
		let entry = entry.map_err(|source| StageError::WalkFailed {
			path: rule.root.clone(),
			source,
		})?;
		if entry.path().is_file() && rule.matches_name(entry.path()) {
			files.push(entry.into_path());
		}
	}
	Ok(files)
}

fn list_matching(rule: &FilePattern) -> Result<Vec<PathBuf>> {
	let read_err = |source| StageError::ReadFailed {
		path: rule.root.clone(),
		source,
	};

	let mut files = Vec::new();
	for entry in std::fs::read_dir(&rule.root).map_err(read_err)? {
		let path = entry.map_err(read_err)?.path();
		if path.is_file() && rule.matches_name(&path) {
			files.push(path);
		}
	}
	Ok(files)
}
