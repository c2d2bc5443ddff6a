use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{Error, Result};
use crate::fields::{Role, CANONICAL_FIELDS};

/// The two immutable synonym tables loaded once from the configuration
/// workbook (`unzipping_table.xlsx`, `spec.md` §6), plus the
/// station-alias list from the same workbook's `station` sheet.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
	field_headers: HashMap<&'static str, HashSet<String>>,
	party_labels: HashMap<Role, HashSet<String>>,
	/// Synonyms for the `container_number` column of `labels_before_table`.
	/// The decoder itself never harvests a container number from label
	/// text (it comes from the file-name regex, `spec.md` §3) — this is
	/// kept only because the configuration contract names the column.
	container_number_labels: HashSet<String>,
	station_aliases: Vec<(String, String)>,
}

impl LabelCatalog {
	/// Loads and tight-normalizes both synonym tables and the station
	/// alias list from the three sheets of the configuration workbook.
	pub fn load(workbook_path: &Path) -> Result<Self> {
		let mut workbook = open_workbook_auto(workbook_path)
			.map_err(|err| Error::Workbook(err.to_string()))?;

		let labels_range = workbook
			.worksheet_range("labels_before_table")
			.map_err(|_| Error::MissingSheet("labels_before_table".to_string()))?;
		let headers_range = workbook
			.worksheet_range("headers_table")
			.map_err(|_| Error::MissingSheet("headers_table".to_string()))?;
		let station_range = workbook
			.worksheet_range("station")
			.map_err(|_| Error::MissingSheet("station".to_string()))?;

		let (party_labels, container_number_labels) = load_party_labels(&labels_range)?;
		let field_headers = load_field_headers(&headers_range)?;
		let station_aliases = load_station_aliases(&station_range);

		Ok(Self {
			field_headers,
			party_labels,
			container_number_labels,
			station_aliases,
		})
	}

	/// All known header synonyms, flattened across every canonical field.
	/// Used by the header scorer to test a row's cells for membership in
	/// one flat set (`spec.md` §4.2).
	pub fn all_header_synonyms(&self) -> HashSet<&str> {
		self.field_headers
			.values()
			.flat_map(|set| set.iter().map(String::as_str))
			.collect()
	}

	/// The canonical field, if any, whose synonym set contains the
	/// already tight-normalized `cell`.
	pub fn field_for_header(&self, tight_cell: &str) -> Option<&'static str> {
		CANONICAL_FIELDS
			.into_iter()
			.find(|field| self.field_headers[field].contains(tight_cell))
	}

	/// The role, if any, whose synonym set contains the already
	/// tight-normalized `cell`.
	pub fn role_for_label(&self, tight_cell: &str) -> Option<Role> {
		Role::ORDERED
			.into_iter()
			.find(|role| self.party_labels[role].contains(tight_cell))
	}

	pub fn container_number_labels(&self) -> &HashSet<String> {
		&self.container_number_labels
	}

	pub fn station_aliases(&self) -> &[(String, String)] {
		&self.station_aliases
	}
}

fn load_field_headers(range: &calamine::Range<Data>) -> Result<HashMap<&'static str, HashSet<String>>> {
	let header_row = range
		.rows()
		.next()
		.ok_or_else(|| Error::MissingSheet("headers_table".to_string()))?;
	let mut column_of_field: HashMap<&'static str, usize> = HashMap::new();
	for (index, cell) in header_row.iter().enumerate() {
		if let Some(name) = cell_text(cell) {
			if let Some(field) = CANONICAL_FIELDS.into_iter().find(|f| **f == name) {
				column_of_field.insert(field, index);
			}
		}
	}

	let mut result: HashMap<&'static str, HashSet<String>> = HashMap::new();
	for field in CANONICAL_FIELDS {
		let Some(&column) = column_of_field.get(field) else {
			return Err(Error::MissingColumn(field.to_string()));
		};
		let synonyms = range
			.rows()
			.skip(1)
			.filter_map(|row| row.get(column))
			.filter_map(cell_text)
			.filter_map(|text| uc_text::tight(Some(&text)))
			.collect();
		result.insert(field, synonyms);
	}
	Ok(result)
}

fn load_party_labels(
	range: &calamine::Range<Data>,
) -> Result<(HashMap<Role, HashSet<String>>, HashSet<String>)> {
	let header_row = range
		.rows()
		.next()
		.ok_or_else(|| Error::MissingSheet("labels_before_table".to_string()))?;

	// The first six columns are consumed positionally (spec.md §6); the
	// header text in that sheet is documentation, not a lookup key.
	let mut party_labels = HashMap::new();
	for (index, role) in Role::ORDERED.into_iter().enumerate() {
		let synonyms = range
			.rows()
			.skip(1)
			.filter_map(|row| row.get(index))
			.filter_map(cell_text)
			.filter_map(|text| uc_text::tight(Some(&text)))
			.collect();
		party_labels.insert(role, synonyms);
	}

	let container_index = Role::ORDERED.len();
	let container_number_labels = if header_row.len() > container_index {
		range
			.rows()
			.skip(1)
			.filter_map(|row| row.get(container_index))
			.filter_map(cell_text)
			.filter_map(|text| uc_text::tight(Some(&text)))
			.collect()
	} else {
		HashSet::new()
	};

	Ok((party_labels, container_number_labels))
}

fn load_station_aliases(range: &calamine::Range<Data>) -> Vec<(String, String)> {
	range
		.rows()
		.skip(1)
		.filter_map(|row| {
			let substring = row.first().and_then(cell_text)?;
			let replacement = row.get(1).and_then(cell_text)?;
			Some((substring, replacement))
		})
		.collect()
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

	#[test]
	fn role_order_has_six_roles() {
		assert_eq!(Role::ORDERED.len(), 6);
	}
}
