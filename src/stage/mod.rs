//! Staging orchestration.
//!
//! A run performs, in order:
//! 1. Bindings tree merge into the include directory, then renames
//! 2. Library copy into the lib directory
//! 3. Companion source copy plus rewrite
//! 4. Example source copy
//!
//! Steps 1-3 need the native build output and are skipped when the target
//! directory is missing. Step 4 always runs. The first error aborts the run;
//! nothing already written is rolled back.

pub mod fsops;
pub mod jobs;

pub use fsops::{MergeStats, copy_file, copy_into_dir, ensure_dir, merge_tree};
pub use jobs::{
	apply_renames, find_special_library, stage_bindings, stage_companions, stage_examples,
	stage_libraries,
};

use crate::config::StageConfig;
use crate::error::Result;
use tracing::{info, warn};

/// Summary of what a staging run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
	/// True when the target directory was missing and only examples ran.
	pub skipped_native: bool,
	pub bindings_copied: usize,
	pub bindings_rewritten: usize,
	pub renamed: usize,
	pub libraries: usize,
	pub companions_copied: usize,
	pub companions_rewritten: usize,
	pub examples: usize,
}

/// Runs the staging jobs for one configuration.
#[derive(Debug, Clone)]
pub struct Stager {
	config: StageConfig,
}

impl Stager {
	pub fn new(config: StageConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &StageConfig {
		&self.config
	}

	pub fn run(&self) -> Result<StageReport> {
		let config = &self.config;
		let mut report = StageReport::default();

		if config.target_dir.is_dir() {
			info!(target_dir = %config.target_dir.display(), "staging native artifacts");

			let merged = stage_bindings(config)?;
			report.bindings_copied = merged.copied;
			report.bindings_rewritten = merged.rewritten;
			report.renamed = apply_renames(&config.include_dir, &config.renames)?;

			report.libraries = stage_libraries(config)?;

			let (copied, rewritten) = stage_companions(config)?;
			report.companions_copied = copied;
			report.companions_rewritten = rewritten;
		} else {
			warn!(
				target_dir = %config.target_dir.display(),
				"target directory not found, skipping bindings, libraries and companion sources"
			);
			report.skipped_native = true;
		}

		report.examples = stage_examples(config)?;
		Ok(report)
	}
}
