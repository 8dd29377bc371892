use crate::error::{Result, StageError};
use crate::rewrite::table::RewriteTable;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Rewrite `path` in place if any rule matches.
///
/// Returns whether the file changed. The new content is written to a sibling
/// temporary file and renamed over the original, so a crash never leaves a
/// truncated file behind.
pub fn rewrite_file(path: &Path, table: &RewriteTable) -> Result<bool> {
	let text = read_text(path)?;
	let Some(rewritten) = table.apply(&text) else {
		return Ok(false);
	};

	write_atomic(path, rewritten.as_bytes(), path)?;
	debug!(path = %path.display(), "rewrote includes");
	Ok(true)
}

/// Write `src` to `dest`, rewritten through `table` when it matches.
///
/// `src` is never modified. Returns whether the content was rewritten.
pub fn rewrite_into(src: &Path, dest: &Path, table: &RewriteTable) -> Result<bool> {
	let text = read_text(src)?;
	match table.apply(&text) {
		Some(rewritten) => {
			write_atomic(dest, rewritten.as_bytes(), src)?;
			debug!(src = %src.display(), dest = %dest.display(), "copied with rewritten includes");
			Ok(true)
		}
		None => {
			write_atomic(dest, text.as_bytes(), src)?;
			Ok(false)
		}
	}
}

/// Replace `dest` with `contents` via a temporary file in the same directory.
///
/// The permissions of `perms_from` are carried over to the new file.
pub fn write_atomic(dest: &Path, contents: &[u8], perms_from: &Path) -> Result<()> {
	let write_err = |source| StageError::WriteFailed {
		path: dest.to_path_buf(),
		source,
	};

	let dir = match dest.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
	tmp.write_all(contents).map_err(write_err)?;
	tmp.as_file().sync_all().map_err(write_err)?;

	let permissions = std::fs::metadata(perms_from)
		.map_err(|source| StageError::ReadFailed {
			path: perms_from.to_path_buf(),
			source,
		})?
		.permissions();
	tmp.as_file().set_permissions(permissions).map_err(write_err)?;

	tmp.persist(dest).map_err(|err| write_err(err.error))?;
	Ok(())
}

fn read_text(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| StageError::ReadFailed {
		path: path.to_path_buf(),
		source,
	})
}
