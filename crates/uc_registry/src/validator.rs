use uc_config::Country;

/// Validates `id` as a structurally plausible taxpayer ID for `country`
/// (`spec.md` §4.4). Whitespace is stripped before validation; the
/// caller is expected to have already tight-normalized the candidate.
pub fn validate(country: Country, id: &str) -> bool {
	match country {
		Country::Russia => validate_russia(id),
		Country::Kazakhstan => validate_kazakhstan(id),
		Country::Belarus => validate_belarus(id),
		Country::Uzbekistan => validate_uzbekistan(id),
	}
}

/// Validates `id` against every country's checksum and returns the
/// first that accepts it, used by the search-engine resolver
/// (`spec.md` §4.6 step 5) when the party's country is not yet known.
pub fn validate_any(id: &str) -> Option<Country> {
	Country::ALL.into_iter().find(|&country| validate(country, id))
}

fn digits_only(id: &str) -> Option<Vec<u32>> {
	let cleaned: String = id.chars().filter(|c| !c.is_whitespace()).collect();
	if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
		return None;
	}
	Some(cleaned.chars().map(|c| c.to_digit(10).expect("ascii digit")).collect())
}

fn weighted_sum(weights: &[u32], digits: &[u32]) -> u32 {
	weights.iter().zip(digits).map(|(w, d)| w * d).sum()
}

fn validate_russia(id: &str) -> bool {
	let Some(digits) = digits_only(id) else {
		return false;
	};
	match digits.len() {
		10 => {
			const WEIGHTS: [u32; 9] = [2, 4, 10, 3, 5, 9, 4, 6, 8];
			let check = weighted_sum(&WEIGHTS, &digits[0..9]) % 11 % 10;
			check == digits[9]
		}
		12 => {
			const WEIGHTS_1: [u32; 10] = [7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
			let check1 = weighted_sum(&WEIGHTS_1, &digits[0..10]) % 11 % 10;
			if check1 != digits[10] {
				return false;
			}
			const WEIGHTS_2: [u32; 11] = [3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
			let mut extended = digits[0..10].to_vec();
			extended.push(check1);
			let check2 = weighted_sum(&WEIGHTS_2, &extended) % 11 % 10;
			check2 == digits[11]
		}
		_ => false,
	}
}

fn validate_kazakhstan(id: &str) -> bool {
	let Some(digits) = digits_only(id) else {
		return false;
	};
	if digits.len() != 12 {
		return false;
	}
	const WEIGHTS_1: [u32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
	let mut check = weighted_sum(&WEIGHTS_1, &digits[0..11]) % 11;
	if check == 10 {
		const WEIGHTS_2: [u32; 11] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 1, 2];
		check = weighted_sum(&WEIGHTS_2, &digits[0..11]) % 11;
	}
	check == digits[11]
}

fn validate_belarus(id: &str) -> bool {
	let Some(digits) = digits_only(id) else {
		return false;
	};
	if digits.len() != 9 || digits.iter().all(|&d| d == 0) {
		return false;
	}
	const WEIGHTS_1: [u32; 8] = [29, 23, 19, 17, 13, 7, 5, 3];
	let mut check = weighted_sum(&WEIGHTS_1, &digits[0..8]) % 11;
	if check == 10 {
		const WEIGHTS_2: [u32; 7] = [23, 19, 17, 13, 7, 5, 3];
		check = weighted_sum(&WEIGHTS_2, &digits[1..8]) % 11;
	}
	check == digits[8]
}

fn validate_uzbekistan(id: &str) -> bool {
	let Some(digits) = digits_only(id) else {
		return false;
	};
	digits.len() == 9 && (3..=8).contains(&digits[0])
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn russia_ten_digit_checksum() {
		assert!(validate(Country::Russia, "7707083893"));
		assert!(!validate(Country::Russia, "7707083894"));
	}

	#[test]
	fn russia_twelve_digit_double_checksum() {
		assert!(validate(Country::Russia, "500100732259"));
		assert!(!validate(Country::Russia, "500100732258"));
	}

	#[test]
	fn russia_rejects_wrong_lengths() {
		assert!(!validate(Country::Russia, "123"));
		assert!(!validate(Country::Russia, "12345678901"));
	}

	#[test]
	fn belarus_rejects_all_zero() {
		assert!(!validate(Country::Belarus, "000000000"));
	}

	#[test]
	fn uzbekistan_checks_first_digit_range() {
		assert!(validate(Country::Uzbekistan, "301234567"));
		assert!(!validate(Country::Uzbekistan, "201234567"));
		assert!(!validate(Country::Uzbekistan, "30123456"));
	}

	#[test]
	fn validate_any_returns_first_match() {
		assert_eq!(validate_any("7707083893"), Some(Country::Russia));
		assert_eq!(validate_any("not a number"), None);
	}
}
