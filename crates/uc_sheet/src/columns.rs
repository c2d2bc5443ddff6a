use std::collections::HashMap;

use uc_config::CANONICAL_FIELDS;

/// Per-sheet mapping from canonical field name to column index
/// (`spec.md` §3). Discarded at sheet boundary.
#[derive(Debug, Clone, Default)]
pub struct ColumnPositions {
	positions: HashMap<&'static str, usize>,
}

impl ColumnPositions {
	pub fn empty() -> Self {
		Self {
			positions: HashMap::new(),
		}
	}

	/// The positional fallback used before any header row has been seen,
	/// letting a headerless table still be recognized
	/// (`spec.md` §8 end-to-end scenario 5: "tnved_code column was
	/// pre-located by the workbook-default mapping"). Canonical fields
	/// occupy columns `0..11` in the order `spec.md` §6 enumerates them.
	pub fn default_mapping() -> Self {
		let positions = CANONICAL_FIELDS
			.into_iter()
			.enumerate()
			.map(|(index, field)| (field, index))
			.collect();
		Self { positions }
	}

	pub fn get(&self, field: &str) -> Option<usize> {
		self.positions.get(field).copied()
	}

	pub fn is_known(&self, field: &str) -> bool {
		self.positions.contains_key(field)
	}

	pub fn set(&mut self, field: &'static str, index: usize) {
		self.positions.insert(field, index);
	}
}
