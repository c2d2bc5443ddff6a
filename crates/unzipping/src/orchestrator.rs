use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use uc_config::{Config, LabelCatalog};
use uc_identity::IdentityEnricher;
use uc_sheet::SheetDecoder;
use uc_workbook::Workbook;

use crate::error::Result;

/// Matches a container number embedded in the original file name
/// (`spec.md` §3: four letters followed by seven digits, the ISO 6346
/// owner-code-plus-serial shape).
static CONTAINER_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{4}\d{7}").unwrap());

/// Drives `spec.md` §4.8 end to end for one workbook: decode, enrich,
/// write JSON, and route the source file to `done`/`done_excel` or
/// `errors`/`errors_excel`.
pub struct Orchestrator<'a> {
	pub catalog: &'a LabelCatalog,
	pub config: &'a Config,
	pub enricher: &'a IdentityEnricher<'a>,
}

impl<'a> Orchestrator<'a> {
	/// Processes one workbook. Never propagates an error past itself —
	/// a failure is logged and the source file is routed to
	/// `errors_excel/`/`errors/` instead (`spec.md` §5: one bad
	/// workbook must not halt the batch).
	pub async fn process(&self, path: &Path) {
		match self.process_inner(path).await {
			Ok(json_path) => {
				tracing::info!(source = %path.display(), json = %json_path.display(), "workbook processed");
				self.route(path, self.config.paths.done_excel(), self.config.paths.done());
			}
			Err(err) => {
				tracing::error!(source = %path.display(), error = %err, "workbook failed");
				self.route(path, self.config.paths.errors_excel(), self.config.paths.errors());
			}
		}
	}

	async fn process_inner(&self, path: &Path) -> Result<PathBuf> {
		let original_file_name = path
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or_default()
			.to_string();

		let mut workbook = Workbook::open(path)?;
		let sheet_name = workbook.pick_sheet_name()?;
		let rows = workbook.read_rows(&sheet_name)?;

		let mut decoder = SheetDecoder::new(self.catalog, original_file_name.clone());
		if let Some(container_number) = CONTAINER_NUMBER.find(&original_file_name) {
			decoder
				.header_mut()
				.insert("container_number".to_string(), container_number.as_str().to_string());
		}
		for row in &rows {
			decoder.feed_row(row)?;
		}
		let mut record = decoder.finish()?;

		self.enricher.enrich(&mut record.header, self.catalog).await?;
		for item in &mut record.line_items {
			for (key, value) in &record.header {
				item.entry(key.clone()).or_insert_with(|| value.clone());
			}
		}

		let json_dir = self.config.paths.json();
		std::fs::create_dir_all(&json_dir)?;
		let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("workbook");
		let payload = to_json_four_space(&record.line_items)?;
		let json_path = write_json(&json_dir, stem, &payload)?;

		Ok(json_path)
	}

	/// Copies the source into the audit directory and moves it out of
	/// the input queue into the bucket directory, so a processed file is
	/// never picked up again on the next scan (`spec.md` §6).
	fn route(&self, source: &Path, audit_dir: PathBuf, bucket_dir: PathBuf) {
		let Some(file_name) = source.file_name() else { return };

		for dir in [&audit_dir, &bucket_dir] {
			if let Err(err) = std::fs::create_dir_all(dir) {
				tracing::error!(dir = %dir.display(), error = %err, "failed to create routing directory");
				return;
			}
		}

		let audit_destination = audit_dir.join(file_name);
		if let Err(err) = std::fs::copy(source, &audit_destination) {
			tracing::error!(source = %source.display(), destination = %audit_destination.display(), error = %err, "failed to copy workbook");
			return;
		}

		let bucket_destination = bucket_dir.join(file_name);
		if let Err(err) = std::fs::rename(source, &bucket_destination) {
			tracing::error!(source = %source.display(), destination = %bucket_destination.display(), error = %err, "failed to move workbook");
		}
	}
}

/// Serializes `value` as pretty JSON with a 4-space indent
/// (`spec.md` §6: "UTF-8, pretty-printed (4-space indent), no ASCII
/// escaping"). `serde_json` never escapes non-ASCII text by default, so
/// only the indent width needs overriding from its 2-space default.
fn to_json_four_space<T: serde::Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
	let mut buffer = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
	value.serialize(&mut serializer)?;
	Ok(buffer)
}

/// Writes `payload` under `dir/<stem>.json`, following the collision
/// rule of `spec.md` §4.8 step 5: if a file with that basename already
/// exists and holds the same byte size, overwrite it; otherwise append
/// `_N` with the smallest `N` that makes the path unique.
fn write_json(dir: &Path, stem: &str, payload: &[u8]) -> std::io::Result<PathBuf> {
	let base = dir.join(format!("{stem}.json"));
	let path = match std::fs::metadata(&base) {
		Err(_) => base,
		Ok(metadata) if metadata.len() == payload.len() as u64 => base,
		Ok(_) => {
			let mut n = 1;
			loop {
				let candidate = dir.join(format!("{stem}_{n}.json"));
				match std::fs::metadata(&candidate) {
					Err(_) => break candidate,
					Ok(metadata) if metadata.len() == payload.len() as u64 => break candidate,
					Ok(_) => n += 1,
				}
			}
		}
	};
	std::fs::write(&path, payload)?;
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn container_number_regex_matches_iso_shape() {
		let found = CONTAINER_NUMBER.find("shipment_MSCU1234567_final.xlsx").unwrap();
		assert_eq!(found.as_str(), "MSCU1234567");
	}

	#[test]
	fn write_json_overwrites_when_same_size() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("foo.json"), b"{\"a\":1}").unwrap();
		let path = write_json(dir.path(), "foo", b"{\"a\":2}").unwrap();
		assert_eq!(path.file_name().unwrap().to_str().unwrap(), "foo.json");
		assert_eq!(std::fs::read(&path).unwrap(), b"{\"a\":2}");
	}

	#[test]
	fn write_json_suffixes_when_size_differs() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("foo.json"), b"{}").unwrap();
		let path = write_json(dir.path(), "foo", b"{\"much longer payload\":true}").unwrap();
		assert_eq!(path.file_name().unwrap().to_str().unwrap(), "foo_1.json");
	}
}
