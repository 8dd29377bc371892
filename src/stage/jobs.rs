use crate::collect::{FilePattern, collect_all, collect_files};
use crate::config::{RenameRule, StageConfig};
use crate::error::{Result, StageError};
use crate::rewrite::{RewriteTable, rewrite_file};
use crate::stage::fsops::{MergeStats, copy_into_dir, ensure_dir, merge_tree};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Copy the generated bindings tree into the include directory, rewriting
/// includes on the way.
pub fn stage_bindings(config: &StageConfig) -> Result<MergeStats> {
	let patterns = config
		.binding_patterns
		.iter()
		.map(|pattern| FilePattern::new(pattern, &config.bindings_dir, true))
		.collect::<Result<Vec<_>>>()?;
	let table = RewriteTable::from(config.binding_rewrites.as_slice());

	ensure_dir(&config.include_dir)?;
	let stats = merge_tree(&config.bindings_dir, &config.include_dir, &patterns, &table)?;

	info!(
		from = %config.bindings_dir.display(),
		to = %config.include_dir.display(),
		copied = stats.copied,
		rewritten = stats.rewritten,
		"staged bridge bindings"
	);
	Ok(stats)
}

/// Apply each rename inside the include directory.
pub fn apply_renames(include_dir: &Path, renames: &[RenameRule]) -> Result<usize> {
	for rename in renames {
		let from = include_dir.join(&rename.from);
		let to = include_dir.join(&rename.to);

		if !from.is_file() {
			return Err(StageError::RenameSourceMissing { path: from });
		}
		if let Some(parent) = to.parent() {
			ensure_dir(parent)?;
		}

		std::fs::rename(&from, &to).map_err(|source| StageError::RenameFailed {
			from: from.clone(),
			to: to.clone(),
			source,
		})?;
		debug!(from = %from.display(), to = %to.display(), "renamed staged file");
	}
	Ok(renames.len())
}

/// Copy prebuilt libraries from the target directory into the lib directory.
pub fn stage_libraries(config: &StageConfig) -> Result<usize> {
	ensure_dir(&config.lib_dir)?;

	let mut files = collect_all(&config.library_patterns, &config.target_dir, false)?;
	let special = find_special_library(&config.special_library, &config.target_dir)?;
	if !files.contains(&special) {
		files.push(special);
	}

	for file in &files {
		let target = copy_into_dir(file, &config.lib_dir)?;
		debug!(from = %file.display(), to = %target.display(), "copied library");
	}

	info!(
		from = %config.target_dir.display(),
		to = %config.lib_dir.display(),
		count = files.len(),
		"staged libraries"
	);
	Ok(files.len())
}

/// Locate the single special library anywhere under `search_root`.
///
/// Several matches are expected when more than one build profile or crate
/// produced it. The shallowest path wins, ties broken lexicographically, so a
/// copy directly in `search_root` beats one under `build/`.
pub fn find_special_library(name: &str, search_root: &Path) -> Result<PathBuf> {
	let pattern = FilePattern::new(name, search_root, true)?;
	let mut matches = collect_files(&pattern)?;
	matches.sort_by(|a, b| {
		let (depth_a, depth_b) = (a.components().count(), b.components().count());
		depth_a.cmp(&depth_b).then_with(|| a.cmp(b))
	});

	if matches.len() > 1 {
		warn!(
			name,
			count = matches.len(),
			chosen = %matches[0].display(),
			"multiple candidates found, using the first"
		);
	}

	matches
		.into_iter()
		.next()
		.ok_or_else(|| StageError::SpecialArtifactNotFound {
			name: name.to_string(),
			search_root: search_root.to_path_buf(),
		})
}

/// Copy the companion sources into the include directory and rewrite the copies.
pub fn stage_companions(config: &StageConfig) -> Result<(usize, usize)> {
	ensure_dir(&config.include_dir)?;
	let table = RewriteTable::from(config.companion_rewrites.as_slice());

	let mut copied = Vec::with_capacity(config.companion_sources.len());
	for src in &config.companion_sources {
		copied.push(copy_into_dir(src, &config.include_dir)?);
	}

	let mut rewritten = 0;
	for file in &copied {
		if rewrite_file(file, &table)? {
			rewritten += 1;
		}
	}

	info!(
		to = %config.include_dir.display(),
		copied = copied.len(),
		rewritten,
		"staged companion sources"
	);
	Ok((copied.len(), rewritten))
}

/// Copy example sources into the examples destination.
pub fn stage_examples(config: &StageConfig) -> Result<usize> {
	if config.example_sources.is_empty() {
		return Ok(0);
	}

	ensure_dir(&config.examples_dest)?;
	for src in &config.example_sources {
		copy_into_dir(src, &config.examples_dest)?;
	}

	info!(
		to = %config.examples_dest.display(),
		count = config.example_sources.len(),
		"staged example sources"
	);
	Ok(config.example_sources.len())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::RewriteRule;
	use std::fs;

	fn touch(path: &Path, contents: &str) {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(path, contents).unwrap();
	}

	fn config_in(root: &Path) -> StageConfig {
		StageConfig {
			target_dir: root.join("target/release"),
			bindings_dir: root.join("target/cxxbridge"),
			include_dir: root.join("demo/include"),
			lib_dir: root.join("demo/lib"),
			examples_dest: root.join("demo"),
			companion_sources: vec![root.join("bindings/include/pay.h")],
			example_sources: Vec::new(),
			renames: Vec::new(),
			..Default::default()
		}
	}

	#[test]
	fn test_find_special_library_picks_first_sorted() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir.path().join("build/b-2/out/libcxxbridge1.a"), "b");
		touch(&dir.path().join("build/a-1/out/libcxxbridge1.a"), "a");

		let found = find_special_library("libcxxbridge1.a", dir.path()).unwrap();

		assert_eq!(found, dir.path().join("build/a-1/out/libcxxbridge1.a"));
	}

	#[test]
	fn test_find_special_library_prefers_shallowest() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir.path().join("build/a-1/out/libcxxbridge1.a"), "nested");
		touch(&dir.path().join("libcxxbridge1.a"), "top");

		let found = find_special_library("libcxxbridge1.a", dir.path()).unwrap();

		assert_eq!(found, dir.path().join("libcxxbridge1.a"));
	}

	#[test]
	fn test_stage_libraries_keeps_top_level_special() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		touch(&config.target_dir.join("libcxxbridge1.a"), "top");
		touch(
			&config.target_dir.join("build/cxx-1/out/libcxxbridge1.a"),
			"nested",
		);

		assert_eq!(stage_libraries(&config).unwrap(), 1);
		assert_eq!(
			fs::read_to_string(config.lib_dir.join("libcxxbridge1.a")).unwrap(),
			"top"
		);
	}

	#[test]
	fn test_find_special_library_missing() {
		let dir = tempfile::tempdir().unwrap();

		match find_special_library("libcxxbridge1.a", dir.path()).unwrap_err() {
			StageError::SpecialArtifactNotFound { name, .. } => {
				assert_eq!(name, "libcxxbridge1.a")
			}
			other => panic!("Expected SpecialArtifactNotFound, got {other:?}"),
		}
	}

	#[test]
	fn test_stage_libraries_non_recursive_plus_special() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		touch(&config.target_dir.join("libbindings.a"), "lib");
		touch(&config.target_dir.join("libbindings.dylib"), "dylib");
		touch(&config.target_dir.join("deps/libnested.a"), "nested");
		touch(
			&config.target_dir.join("build/cxx-1/out/libcxxbridge1.a"),
			"bridge",
		);

		let count = stage_libraries(&config).unwrap();

		assert_eq!(count, 3);
		assert!(config.lib_dir.join("libbindings.a").exists());
		assert!(config.lib_dir.join("libbindings.dylib").exists());
		assert!(config.lib_dir.join("libcxxbridge1.a").exists());
		assert!(!config.lib_dir.join("libnested.a").exists());
	}

	#[test]
	fn test_stage_companions_rewrites_only_copies() {
		let dir = tempfile::tempdir().unwrap();
		let config = StageConfig {
			companion_rewrites: vec![RewriteRule::new(
				r#"#include "bindings/include/pay.h""#,
				r#"#include "pay.h""#,
			)],
			..config_in(dir.path())
		};
		let source = dir.path().join("bindings/include/pay.h");
		touch(&source, "#include \"bindings/include/pay.h\"\n");
		// Pre-existing header in the include dir that is not a companion
		touch(
			&config.include_dir.join("other.h"),
			"#include \"bindings/include/pay.h\"\n",
		);

		let (copied, rewritten) = stage_companions(&config).unwrap();

		assert_eq!((copied, rewritten), (1, 1));
		assert_eq!(
			fs::read_to_string(config.include_dir.join("pay.h")).unwrap(),
			"#include \"pay.h\"\n"
		);
		assert_eq!(
			fs::read_to_string(config.include_dir.join("other.h")).unwrap(),
			"#include \"bindings/include/pay.h\"\n"
		);
		assert_eq!(
			fs::read_to_string(&source).unwrap(),
			"#include \"bindings/include/pay.h\"\n"
		);
	}

	#[test]
	fn test_apply_renames_moves_file() {
		let dir = tempfile::tempdir().unwrap();
		touch(&dir.path().join("pkg/src/lib.rs.cc"), "body");
		let renames = vec![RenameRule {
			from: PathBuf::from("pkg/src/lib.rs.cc"),
			to: PathBuf::from("pkg/src/pkg-lib.rs.cc"),
		}];

		assert_eq!(apply_renames(dir.path(), &renames).unwrap(), 1);
		assert!(!dir.path().join("pkg/src/lib.rs.cc").exists());
		assert_eq!(
			fs::read_to_string(dir.path().join("pkg/src/pkg-lib.rs.cc")).unwrap(),
			"body"
		);
	}

	#[test]
	fn test_apply_renames_missing_source() {
		let dir = tempfile::tempdir().unwrap();
		let renames = vec![RenameRule {
			from: PathBuf::from("absent.cc"),
			to: PathBuf::from("present.cc"),
		}];

		assert!(matches!(
			apply_renames(dir.path(), &renames),
			Err(StageError::RenameSourceMissing { .. })
		));
	}

	#[test]
	fn test_stage_examples_copies_files() {
		let dir = tempfile::tempdir().unwrap();
		let example = dir.path().join("example/main.cc");
		touch(&example, "int main() {}");
		let config = StageConfig {
			example_sources: vec![example],
			..config_in(dir.path())
		};

		assert_eq!(stage_examples(&config).unwrap(), 1);
		assert_eq!(
			fs::read_to_string(config.examples_dest.join("main.cc")).unwrap(),
			"int main() {}"
		);
	}
}
