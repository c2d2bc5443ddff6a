use std::collections::BTreeMap;

/// Header fields are ordered (`BTreeMap`, not `HashMap`) so that two runs
/// over the same workbook with an unchanged cache serialize to
/// byte-identical JSON (`spec.md` §8, idempotence).
pub type Header = BTreeMap<String, String>;

/// A single workbook's decoded, denormalized shipment data
/// (`spec.md` §3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentRecord {
	pub header: Header,
	pub line_items: Vec<Header>,
}

impl ShipmentRecord {
	pub fn new(original_file_name: impl Into<String>) -> Self {
		let mut header = Header::new();
		header.insert("original_file_name".to_string(), original_file_name.into());
		Self {
			header,
			line_items: Vec::new(),
		}
	}

	/// Freezes the current header and appends a line item carrying
	/// `tnved_code` plus a snapshot of every header field set so far
	/// (`spec.md` §3 invariant, §4.3.3).
	pub fn emit_line_item(&mut self, tnved_code: String) {
		let mut item = self.header.clone();
		item.insert("tnved_code".to_string(), tnved_code);
		self.line_items.push(item);
	}
}
