use crate::collect::FilePattern;
use crate::error::{Result, StageError};
use crate::rewrite::{RewriteTable, rewrite_into};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files written by a tree merge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
	pub copied: usize,
	pub rewritten: usize,
}

/// Create `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
	std::fs::create_dir_all(path).map_err(|source| StageError::CreateDirFailed {
		path: path.to_path_buf(),
		source,
	})
}

/// Merge the tree at `src` into `dest`.
///
/// Existing destination files are overwritten, files only present in `dest`
/// are kept. Files whose name matches one of `rewrite_patterns` pass through
/// `table` on the way; the source tree is never modified. Symlinks are
/// followed, so linked files and directories land in `dest` as real copies.
pub fn merge_tree(
	src: &Path,
	dest: &Path,
	rewrite_patterns: &[FilePattern],
	table: &RewriteTable,
) -> Result<MergeStats> {
	if !src.is_dir() {
		return Err(StageError::SearchRootNotFound {
			path: src.to_path_buf(),
		});
	}

	let mut stats = MergeStats::default();
	for entry in WalkDir::new(src).follow_links(true) {
		let entry = entry.map_err(|source| StageError::WalkFailed {
			path: src.to_path_buf(),
			source,
		})?;
		let relative = entry
			.path()
			.strip_prefix(src)
			.unwrap_or_else(|_| entry.path());
		let target = dest.join(relative);

		if entry.file_type().is_dir() {
			ensure_dir(&target)?;
			continue;
		}

		let wants_rewrite = rewrite_patterns
			.iter()
			.any(|pattern| pattern.matches_name(entry.path()));
		if wants_rewrite {
			if rewrite_into(entry.path(), &target, table)? {
				stats.rewritten += 1;
			}
		} else {
			copy_file(entry.path(), &target)?;
		}
		stats.copied += 1;
	}

	Ok(stats)
}

/// Copy `src` into directory `dest_dir`, keeping its base name.
pub fn copy_into_dir(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
	let name = src.file_name().ok_or_else(|| StageError::NoFileName {
		path: src.to_path_buf(),
	})?;
	let target = dest_dir.join(name);
	copy_file(src, &target)?;
	Ok(target)
}

/// Copy a single file, overwriting `dest`.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
	std::fs::copy(src, dest).map_err(|source| StageError::CopyFailed {
		from: src.to_path_buf(),
		to: dest.to_path_buf(),
		source,
	})?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::RewriteRule;
	use std::fs;

	fn header_patterns(root: &Path) -> Vec<FilePattern> {
		vec![
			FilePattern::new("*.h", root, true).unwrap(),
			FilePattern::new("*.cc", root, true).unwrap(),
		]
	}

	fn table() -> RewriteTable {
		RewriteTable::new(vec![RewriteRule::new("old.h", "new.h")])
	}

	#[test]
	fn test_merge_tree_copies_nested_files() {
		let src = tempfile::tempdir().unwrap();
		let dest = tempfile::tempdir().unwrap();
		fs::create_dir_all(src.path().join("pkg/src")).unwrap();
		fs::write(src.path().join("pkg/src/lib.rs.h"), "#include \"old.h\"").unwrap();
		fs::write(src.path().join("pkg/src/notes.txt"), "old.h").unwrap();

		let stats = merge_tree(src.path(), dest.path(), &header_patterns(src.path()), &table())
			.unwrap();

		assert_eq!(stats, MergeStats { copied: 2, rewritten: 1 });
		assert_eq!(
			fs::read_to_string(dest.path().join("pkg/src/lib.rs.h")).unwrap(),
			"#include \"new.h\""
		);
		// Only pattern matches are rewritten
		assert_eq!(
			fs::read_to_string(dest.path().join("pkg/src/notes.txt")).unwrap(),
			"old.h"
		);
		assert_eq!(
			fs::read_to_string(src.path().join("pkg/src/lib.rs.h")).unwrap(),
			"#include \"old.h\""
		);
	}

	#[test]
	fn test_merge_tree_keeps_unrelated_files() {
		let src = tempfile::tempdir().unwrap();
		let dest = tempfile::tempdir().unwrap();
		fs::write(src.path().join("a.h"), "fresh").unwrap();
		fs::write(dest.path().join("a.h"), "stale").unwrap();
		fs::write(dest.path().join("sentinel.txt"), "keep me").unwrap();

		merge_tree(src.path(), dest.path(), &[], &table()).unwrap();

		assert_eq!(fs::read_to_string(dest.path().join("a.h")).unwrap(), "fresh");
		assert_eq!(
			fs::read_to_string(dest.path().join("sentinel.txt")).unwrap(),
			"keep me"
		);
	}

	#[cfg(unix)]
	#[test]
	fn test_merge_tree_follows_linked_directory() {
		use std::os::unix::fs::symlink;

		let src = tempfile::tempdir().unwrap();
		let linked = tempfile::tempdir().unwrap();
		let dest = tempfile::tempdir().unwrap();
		fs::write(linked.path().join("gen.h"), "#include \"old.h\"").unwrap();
		symlink(linked.path(), src.path().join("pkg")).unwrap();

		let stats = merge_tree(src.path(), dest.path(), &header_patterns(src.path()), &table())
			.unwrap();

		assert_eq!(stats, MergeStats { copied: 1, rewritten: 1 });
		let staged = dest.path().join("pkg/gen.h");
		let pkg_meta = fs::symlink_metadata(dest.path().join("pkg")).unwrap();
		assert!(pkg_meta.file_type().is_dir());
		assert_eq!(fs::read_to_string(&staged).unwrap(), "#include \"new.h\"");
		assert_eq!(
			fs::read_to_string(linked.path().join("gen.h")).unwrap(),
			"#include \"old.h\""
		);
	}

	#[cfg(unix)]
	#[test]
	fn test_merge_tree_copies_linked_file_contents() {
		use std::os::unix::fs::symlink;

		let src = tempfile::tempdir().unwrap();
		let dest = tempfile::tempdir().unwrap();
		let real = src.path().join("real.txt");
		fs::write(&real, "payload").unwrap();
		symlink(&real, src.path().join("link.txt")).unwrap();

		let stats = merge_tree(src.path(), dest.path(), &[], &table()).unwrap();

		assert_eq!(stats.copied, 2);
		let staged = dest.path().join("link.txt");
		assert!(fs::symlink_metadata(&staged).unwrap().file_type().is_file());
		assert_eq!(fs::read_to_string(&staged).unwrap(), "payload");
	}

	#[test]
	fn test_merge_tree_missing_source() {
		let dest = tempfile::tempdir().unwrap();
		let missing = dest.path().join("nope");

		assert!(matches!(
			merge_tree(&missing, dest.path(), &[], &table()),
			Err(StageError::SearchRootNotFound { .. })
		));
	}

	#[test]
	fn test_copy_into_dir_keeps_name() {
		let src = tempfile::tempdir().unwrap();
		let dest = tempfile::tempdir().unwrap();
		let file = src.path().join("pay.h");
		fs::write(&file, "x").unwrap();

		let target = copy_into_dir(&file, dest.path()).unwrap();

		assert_eq!(target, dest.path().join("pay.h"));
		assert_eq!(fs::read_to_string(target).unwrap(), "x");
	}

	#[test]
	fn test_copy_missing_file_fails() {
		let dest = tempfile::tempdir().unwrap();
		let missing = dest.path().join("missing.cc");

		assert!(matches!(
			copy_into_dir(&missing, dest.path()),
			Err(StageError::CopyFailed { .. })
		));
	}
}
