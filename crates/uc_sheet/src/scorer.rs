use std::collections::HashSet;

/// Result of scoring one row as a candidate table header (`spec.md`
/// §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderScore {
	pub non_null_cells: usize,
	pub score: u32,
}

/// The header-probability coefficient: the minimum score a row needs to
/// qualify as a header.
pub const HEADER_PROBABILITY_COEFFICIENT: u32 = 20;

/// The minimum number of non-null cells a row needs to qualify as a
/// header, independent of score.
pub const MIN_HEADER_CELLS: usize = 5;

/// Scores `row` against the flattened set of header synonyms.
pub fn score_row(row: &[Option<String>], synonyms: &HashSet<&str>) -> HeaderScore {
	let non_null_cells = row.iter().filter(|cell| cell.is_some()).count();
	if non_null_cells == 0 {
		return HeaderScore {
			non_null_cells: 0,
			score: 0,
		};
	}

	let matches = row
		.iter()
		.filter_map(|cell| uc_text::tight(cell.as_deref()))
		.filter(|tight| synonyms.contains(tight.as_str()))
		.count();

	HeaderScore {
		non_null_cells,
		score: (100 * matches / non_null_cells) as u32,
	}
}

/// A row qualifies as the header iff its score is at least the
/// header-probability coefficient and it has enough non-null cells to
/// rule out a stray one-off match.
pub fn qualifies(score: HeaderScore) -> bool {
	score.score >= HEADER_PROBABILITY_COEFFICIENT && score.non_null_cells >= MIN_HEADER_CELLS
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn score_is_bounded_zero_to_hundred() {
		let synonyms: HashSet<&str> = ["MODEL", "TNVEDCODE"].into_iter().collect();
		let row = vec![Some("Model".to_string()), Some("Tnved code".to_string())];
		let score = score_row(&row, &synonyms);
		assert_eq!(score, HeaderScore { non_null_cells: 2, score: 100 });
	}

	#[test]
	fn row_with_no_synonym_matches_never_qualifies() {
		let synonyms: HashSet<&str> = ["MODEL"].into_iter().collect();
		let row: Vec<Option<String>> = (0..6).map(|i| Some(format!("junk{i}"))).collect();
		let score = score_row(&row, &synonyms);
		assert_eq!(score.score, 0);
		assert!(!qualifies(score));
	}

	#[test]
	fn empty_row_scores_zero() {
		let synonyms: HashSet<&str> = HashSet::new();
		let score = score_row(&[None, None], &synonyms);
		assert_eq!(score, HeaderScore { non_null_cells: 0, score: 0 });
	}
}
