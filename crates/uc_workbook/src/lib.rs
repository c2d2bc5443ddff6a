mod error;

pub use error::{Error, Result};

use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use uc_config::PRIORITY_SHEET_NAMES;

/// One sheet row, cell-for-cell; a blank/empty cell is `None`
/// (`spec.md` §4.8 step 2).
pub type Row = Vec<Option<String>>;

/// A workbook opened for row-level reading (`spec.md` §6: arbitrary
/// `.xls`/`.xlsx` input layouts).
pub struct Workbook {
	sheets: Sheets<BufReader<std::fs::File>>,
}

impl Workbook {
	pub fn open(path: &Path) -> Result<Self> {
		let sheets = open_workbook_auto(path).map_err(|err| Error::Open(err.to_string()))?;
		Ok(Self { sheets })
	}

	pub fn sheet_names(&self) -> Vec<String> {
		self.sheets.sheet_names().to_vec()
	}

	/// Picks the sheet the orchestrator should decode (`spec.md` §4.8
	/// step 1): the first whose name contains any `priority_sheet_names`
	/// entry as a case-sensitive substring, else the first sheet.
	pub fn pick_sheet_name(&self) -> Result<String> {
		let names = self.sheet_names();
		let preferred = names
			.iter()
			.find(|name| PRIORITY_SHEET_NAMES.iter().any(|priority| name.contains(priority)))
			.cloned();
		preferred.or_else(|| names.first().cloned()).ok_or(Error::NoSheets)
	}

	/// Reads `sheet_name` as a table of optional strings, dropping rows
	/// where every cell is null (`spec.md` §4.8 step 2).
	pub fn read_rows(&mut self, sheet_name: &str) -> Result<Vec<Row>> {
		let range = self
			.sheets
			.worksheet_range(sheet_name)
			.map_err(|_| Error::MissingSheet(sheet_name.to_string()))?;

		Ok(range
			.rows()
			.map(|row| row.iter().map(cell_text).collect::<Row>())
			.filter(|row: &Row| row.iter().any(Option::is_some))
			.collect())
	}
}

fn cell_text(cell: &Data) -> Option<String> {
	match cell {
		Data::Empty => None,
		Data::String(s) if s.trim().is_empty() => None,
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn pick_sheet_name_prefers_priority_match() {
		// Exercised indirectly through the priority-list constant; the
		// actual sheet lookup needs a real workbook, covered by the
		// orchestrator's integration tests.
		assert!(PRIORITY_SHEET_NAMES.contains(&"инвойс"));
	}
}
