use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration from a `.cxx-stage.toml` file.
///
/// Any field left out of the file keeps its built-in default, so an empty
/// file stages the same layout as no file at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StageConfig {
	/// Native build output directory. Library staging and the bindings jobs
	/// only run when it exists.
	pub target_dir: PathBuf,

	/// Directory tree produced by the bridge generator.
	pub bindings_dir: PathBuf,

	/// Destination for generated bindings and companion sources.
	pub include_dir: PathBuf,

	/// Destination for prebuilt libraries.
	pub lib_dir: PathBuf,

	/// Destination for example sources.
	pub examples_dest: PathBuf,

	/// File name patterns in the bindings tree that get include rewrites.
	pub binding_patterns: Vec<String>,

	/// Library file name patterns, matched directly inside `target_dir`.
	pub library_patterns: Vec<String>,

	/// Single library searched for recursively under `target_dir`.
	pub special_library: String,

	/// Hand-written sources copied next to the generated bindings.
	pub companion_sources: Vec<PathBuf>,

	/// Example sources copied into `examples_dest`.
	pub example_sources: Vec<PathBuf>,

	/// Substitutions applied to the bindings tree, in order.
	pub binding_rewrites: Vec<RewriteRule>,

	/// Substitutions applied to the copied companion sources, in order.
	pub companion_rewrites: Vec<RewriteRule>,

	/// Renames applied inside `include_dir` after the bindings copy.
	pub renames: Vec<RenameRule>,
}

/// A single literal substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewriteRule {
	/// Literal text to search for.
	pub find: String,

	/// Literal text that replaces every occurrence of `find`.
	pub replace: String,
}

/// Moves a staged file to an alternate name to avoid a collision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenameRule {
	/// Path relative to the include directory.
	pub from: PathBuf,

	/// Path relative to the include directory.
	pub to: PathBuf,
}

/// A configuration with the file it was loaded from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The effective configuration.
	pub config: StageConfig,

	/// `None` when only built-in defaults are in effect.
	pub path: Option<PathBuf>,
}

impl RewriteRule {
	pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
		Self {
			find: find.into(),
			replace: replace.into(),
		}
	}
}

impl Default for StageConfig {
	fn default() -> Self {
		Self {
			target_dir: PathBuf::from("../target/release"),
			bindings_dir: PathBuf::from("../target/cxxbridge"),
			include_dir: PathBuf::from("./include"),
			lib_dir: PathBuf::from("./lib"),
			examples_dest: PathBuf::from("."),
			binding_patterns: vec!["*.h".to_string(), "*.cc".to_string()],
			library_patterns: vec![
				"*.a".to_string(),
				"*.dylib".to_string(),
				"*.dll.lib".to_string(),
			],
			special_library: "libcxxbridge1.a".to_string(),
			companion_sources: vec![
				PathBuf::from("../extra-cpp-bindings/include/pay.h"),
				PathBuf::from("../extra-cpp-bindings/src/pay.cc"),
			],
			example_sources: Vec::new(),
			binding_rewrites: vec![
				RewriteRule::new(
					r#"#include "extra-cpp-bindings/src/lib.rs.h""#,
					r#"#include "lib.rs.h""#,
				),
				RewriteRule::new(
					r#"#include "extra-cpp-bindings/include/pay.h""#,
					r#"#include "../../pay.h""#,
				),
			],
			companion_rewrites: vec![RewriteRule::new(
				r#"#include "extra-cpp-bindings/include/pay.h""#,
				r#"#include "pay.h""#,
			)],
			renames: vec![RenameRule {
				from: PathBuf::from("extra-cpp-bindings/src/lib.rs.cc"),
				to: PathBuf::from("extra-cpp-bindings/src/extra-lib.rs.cc"),
			}],
		}
	}
}

impl StageConfig {
	/// Validate rewrite tables and file patterns.
	pub fn validate(&self) -> Result<()> {
		validate_rewrites("binding", &self.binding_rewrites)?;
		validate_rewrites("companion", &self.companion_rewrites)?;

		let patterns = self
			.binding_patterns
			.iter()
			.chain(&self.library_patterns)
			.chain(std::iter::once(&self.special_library));
		for pattern in patterns {
			glob::Pattern::new(pattern).map_err(|source| StageError::InvalidPattern {
				pattern: pattern.clone(),
				source,
			})?;
		}

		Ok(())
	}
}

/// A table may never leave text that one of its own rules would match again,
/// otherwise a second run would rewrite already staged files.
///
/// Rules run in order, so a replacement may contain the `find` of a later
/// rule (that rule consumes it) but not its own or an earlier one.
fn validate_rewrites(table: &str, rules: &[RewriteRule]) -> Result<()> {
	for rule in rules {
		if rule.find.is_empty() {
			return Err(StageError::EmptyRewriteFind {
				table: table.to_string(),
			});
		}
	}

	for (i, rule) in rules.iter().enumerate() {
		if let Some(other) = rules[..=i]
			.iter()
			.find(|other| rule.replace.contains(&other.find))
		{
			return Err(StageError::RewriteNotIdempotent {
				table: table.to_string(),
				find: other.find.clone(),
				replace: rule.replace.clone(),
			});
		}
	}

	Ok(())
}
