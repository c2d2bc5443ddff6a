//! Cell-text canonicalization.
//!
//! Two modes are used throughout the decoder: `tight`, for matching cell
//! text against header/label synonyms, and `loose`, for preserving a
//! human-readable value while stripping noise the source workbooks are
//! prone to (mixed-language boilerplate, stray newlines, doubled spaces).

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static MANY_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));
static DIGIT_SPACE_DIGIT: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?P<a>\d) (?P<b>\d)").expect("valid regex"));

/// Uppercases and strips all whitespace and colon variants. Used to key
/// cell text against the header/label synonym sets, where incidental
/// spacing and casing differences must not prevent a match.
pub fn tight(input: Option<&str>) -> Option<String> {
	let input = input?;
	let stripped: String = input
		.chars()
		.filter(|&c| c != ':' && c != '：')
		.collect();
	Some(WHITESPACE.replace_all(&stripped, "").to_uppercase())
}

/// Strips Han characters, folds newlines into single spaces, collapses
/// runs of spaces, and trims. Used to preserve a value (party name,
/// station, address line) while dropping the bilingual/trilingual
/// boilerplate some workbooks embed alongside it.
pub fn loose(input: Option<&str>) -> Option<String> {
	let input = input?;
	let without_han: String = input
		.chars()
		.filter(|&c| !is_han(c))
		.collect();
	let single_lines = without_han.replace(['\n', '\r'], " ");
	let collapsed = MANY_SPACES.replace_all(&single_lines, " ");
	Some(collapsed.trim().to_string())
}

fn is_han(c: char) -> bool {
	('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// True iff `s` parses as a decimal number once a single interior space
/// surrounded by digits (e.g. `"1 234"`) has been removed. `None` and
/// unparseable strings are `false`.
pub fn is_numeric(s: Option<&str>) -> bool {
	let Some(s) = s else { return false };
	let joined = DIGIT_SPACE_DIGIT.replace(s, "$a$b");
	joined.trim().parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn tight_strips_whitespace_and_colons_and_uppercases() {
		assert_eq!(tight(Some(" Seller : \n")), Some("SELLER".to_string()));
		assert_eq!(tight(Some("地址：")), Some("地址".to_string()));
		assert_eq!(tight(None), None);
	}

	#[test]
	fn loose_drops_han_and_collapses_whitespace() {
		assert_eq!(
			loose(Some("Address/ Адрес/ 地址  \n  Moscow")),
			Some("Address/ Адрес/  Moscow".to_string())
		);
		assert_eq!(loose(None), None);
	}

	#[test]
	fn is_numeric_handles_grouped_digits() {
		assert!(is_numeric(Some("1 234")));
		assert!(is_numeric(Some("42")));
		assert!(is_numeric(Some("42.5")));
		assert!(!is_numeric(Some("abc")));
		assert!(!is_numeric(None));
	}
}
