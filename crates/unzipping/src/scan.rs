use std::path::{Path, PathBuf};
use std::time::Duration;

/// The file-stability gate's wait (`spec.md` §5): read size, sleep,
/// re-read, proceed only if unchanged. Guards against partial uploads.
pub const DEFAULT_STABILITY_GATE: Duration = Duration::from_secs(300);

/// Non-recursive listing of `.xls`/`.xlsx` files directly under `dir`,
/// sorted for deterministic processing order (`spec.md` §5: a single
/// producer feeds workbooks to the core sequentially).
pub fn scan_workbooks(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
	let mut paths = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		let is_workbook = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));
		if is_workbook {
			paths.push(path);
		}
	}
	paths.sort();
	Ok(paths)
}

/// `spec.md` §5: reads `path`'s size, sleeps `gate`, re-reads; returns
/// whether the size was unchanged. `gate` is injectable so tests don't
/// block for the full 300 seconds.
pub async fn is_stable(path: &Path, gate: Duration) -> std::io::Result<bool> {
	let before = std::fs::metadata(path)?.len();
	tokio::time::sleep(gate).await;
	let after = std::fs::metadata(path)?.len();
	Ok(before == after)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::time::Duration;

	#[test]
	fn scan_workbooks_lists_only_excel_files_sorted() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("b.xlsx"), b"").unwrap();
		std::fs::write(dir.path().join("a.xls"), b"").unwrap();
		std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
		std::fs::create_dir(dir.path().join("subdir")).unwrap();

		let found = scan_workbooks(dir.path()).unwrap();
		let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
		assert_eq!(names, vec!["a.xls", "b.xlsx"]);
	}

	#[tokio::test]
	async fn is_stable_detects_unchanged_size() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("file.xlsx");
		std::fs::write(&path, b"stable content").unwrap();
		assert!(is_stable(&path, Duration::from_millis(1)).await.unwrap());
	}
}
