use crate::config::RewriteRule;

/// Ordered literal substitutions applied as a unit.
#[derive(Debug, Clone, Default)]
pub struct RewriteTable {
	rules: Vec<RewriteRule>,
}

impl RewriteTable {
	pub fn new(rules: Vec<RewriteRule>) -> Self {
		Self { rules }
	}

	pub fn rules(&self) -> &[RewriteRule] {
		&self.rules
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Whether any `find` string occurs in `text`.
	pub fn matches(&self, text: &str) -> bool {
		self.rules.iter().any(|rule| text.contains(&rule.find))
	}

	/// Apply every rule in order, replacing all occurrences.
	///
	/// Returns `None` when no rule matches, so callers can leave the file alone.
	pub fn apply(&self, text: &str) -> Option<String> {
		if !self.matches(text) {
			return None;
		}

		let rewritten = self
			.rules
			.iter()
			.fold(text.to_string(), |acc, rule| acc.replace(&rule.find, &rule.replace));
		Some(rewritten)
	}
}

impl From<&[RewriteRule]> for RewriteTable {
	fn from(rules: &[RewriteRule]) -> Self {
		Self::new(rules.to_vec())
	}
}
