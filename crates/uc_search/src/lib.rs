mod error;
mod xml;

pub use error::{Error, Result};

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use uc_cache::IdentityCache;
use uc_config::{Country, SearchConfig};

const DROP_CHARS: &[char] = &[
	'<', '>', '«', '»', '\'', '"', '.', ',', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '[', ']', '{', '}',
	';', '?', '|', '~', '=', '_', '+', '‘', '’', '“', '”',
];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Strips search-unsafe punctuation and collapses whitespace
/// (`spec.md` §4.6 step 1). Also used as the cache key.
pub fn clean_query(raw: &str) -> String {
	let stripped: String = raw.chars().filter(|c| !DROP_CHARS.contains(c)).collect();
	stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_digit_runs(text: &str) -> impl Iterator<Item = &str> {
	DIGIT_RUN.find_iter(text).map(|m| m.as_str())
}

/// The result of a search-engine lookup (`spec.md` §4.6 step 7).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
	pub taxpayer_id: Option<String>,
	pub country: Option<Country>,
	pub found_in_invoice: bool,
}

struct Candidate {
	count: u32,
	country: Country,
	title: String,
}

/// Resolves a party name to a taxpayer ID by querying the XML-river
/// search endpoint and validating digit runs found in the results
/// against every country's checksum (`spec.md` §4.6).
pub struct SearchEngineResolver<'a> {
	client: Client,
	cache: &'a IdentityCache,
	config: &'a SearchConfig,
}

impl<'a> SearchEngineResolver<'a> {
	pub fn new(cache: &'a IdentityCache, config: &'a SearchConfig) -> Result<Self> {
		let client = Client::builder().timeout(config.timeout).build()?;
		Ok(Self { client, cache, config })
	}

	/// `workbook_text` is the flattened text of the workbook's party
	/// block, if available, used to prefer the candidate whose name
	/// string actually appears in the invoice (`spec.md` §4.6 step 6).
	pub async fn resolve(&self, query: &str, workbook_text: Option<&str>) -> Result<SearchOutcome> {
		let cleaned = clean_query(query);
		if cleaned.is_empty() {
			return Ok(SearchOutcome::default());
		}

		if let Some((taxpayer_id, country)) = self.cache.get_search(&cleaned)? {
			return Ok(SearchOutcome {
				taxpayer_id: Some(taxpayer_id),
				country: Some(country),
				found_in_invoice: false,
			});
		}

		let outcome = self.resolve_uncached(&cleaned, workbook_text, self.config.attempts).await?;
		if let (Some(taxpayer_id), Some(country)) = (&outcome.taxpayer_id, outcome.country) {
			self.cache.put_search(&cleaned, taxpayer_id, country)?;
		}
		Ok(outcome)
	}

	/// `spec.md` §4.6 retry policy: a connection failure (or a
	/// non-`200`/`110`/`111`/`15` error code) sleeps `retry_sleep` and
	/// recurses with `attempts - 1`, floored at zero.
	fn resolve_uncached<'b>(
		&'b self,
		cleaned: &'b str,
		workbook_text: Option<&'b str>,
		attempts: u32,
	) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<SearchOutcome>> + Send + 'b>> {
		Box::pin(async move {
			if attempts == 0 {
				return Ok(SearchOutcome::default());
			}

			let query = format!("{cleaned} ИНН");
			let response = self
				.client
				.get(&self.config.endpoint)
				.query(&[("user", self.config.user.as_str()), ("key", self.config.key.as_str()), ("query", query.as_str())])
				.send()
				.await;

			let body = match response {
				Ok(response) => response.text().await?,
				Err(err) => {
					tracing::warn!(error = %err, attempts, "search engine request failed, retrying");
					tokio::time::sleep(self.config.retry_sleep).await;
					return self.resolve_uncached(cleaned, workbook_text, attempts - 1).await;
				}
			};

			match xml::parse(&body)? {
				xml::XmlRiverResponse::Error { code } => match code.as_str() {
					"200" => Err(Error::Fatal(code)),
					"110" | "111" => {
						tracing::warn!(code, "search engine capacity exhausted");
						Ok(SearchOutcome::default())
					}
					"15" => Ok(SearchOutcome::default()),
					_ => {
						tracing::warn!(code, attempts, "search engine returned a retryable error");
						tokio::time::sleep(self.config.retry_sleep).await;
						self.resolve_uncached(cleaned, workbook_text, attempts - 1).await
					}
				},
				xml::XmlRiverResponse::Docs(docs) => Ok(score_docs(docs, workbook_text)),
			}
		})
	}
}

fn score_docs(docs: Vec<xml::XmlRiverDoc>, workbook_text: Option<&str>) -> SearchOutcome {
	let mut candidates: HashMap<String, Candidate> = HashMap::new();
	for doc in &docs {
		for field in [doc.title.as_str(), doc.passage.as_str()] {
			for digits in extract_digit_runs(field) {
				let Some(country) = uc_registry::validate_any(digits) else {
					continue;
				};
				candidates
					.entry(digits.to_string())
					.and_modify(|candidate| candidate.count += 1)
					.or_insert_with(|| Candidate {
						count: 1,
						country,
						title: doc.title.clone(),
					});
			}
		}
	}

	if candidates.is_empty() {
		return SearchOutcome::default();
	}

	if let Some(text) = workbook_text {
		if let Some((taxpayer_id, candidate)) = candidates
			.iter()
			.find(|(_, candidate)| !candidate.title.is_empty() && text.contains(&candidate.title))
		{
			return SearchOutcome {
				taxpayer_id: Some(taxpayer_id.clone()),
				country: Some(candidate.country),
				found_in_invoice: true,
			};
		}
	}

	let (taxpayer_id, candidate) = candidates
		.into_iter()
		.max_by_key(|(_, candidate)| candidate.count)
		.expect("candidates is non-empty");

	SearchOutcome {
		taxpayer_id: Some(taxpayer_id),
		country: Some(candidate.country),
		found_in_invoice: false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn clean_query_drops_punctuation_and_collapses_spaces() {
		assert_eq!(clean_query("  \"ACME\"   Trading, LLC!  "), "ACME Trading LLC");
	}

	#[test]
	fn clean_query_handles_empty_input() {
		assert_eq!(clean_query("...,,,"), "");
	}

	#[test]
	fn score_docs_prefers_higher_frequency_candidate() {
		let docs = vec![
			xml::XmlRiverDoc {
				title: "ACME 7707083893".to_string(),
				passage: "reg 7707083893".to_string(),
			},
			xml::XmlRiverDoc {
				title: "Other 301234567".to_string(),
				passage: String::new(),
			},
		];
		let outcome = score_docs(docs, None);
		assert_eq!(outcome.taxpayer_id.as_deref(), Some("7707083893"));
		assert_eq!(outcome.country, Some(Country::Russia));
		assert!(!outcome.found_in_invoice);
	}

	#[test]
	fn score_docs_prefers_candidate_found_in_workbook_text() {
		let docs = vec![
			xml::XmlRiverDoc {
				title: "High frequency 7707083893".to_string(),
				passage: "7707083893 7707083893".to_string(),
			},
			xml::XmlRiverDoc {
				title: "Invoice match 301234567".to_string(),
				passage: String::new(),
			},
		];
		let outcome = score_docs(docs, Some("line item mentions Invoice match 301234567 somewhere"));
		assert_eq!(outcome.taxpayer_id.as_deref(), Some("301234567"));
		assert!(outcome.found_in_invoice);
	}

	#[test]
	fn score_docs_returns_default_when_nothing_validates() {
		let docs = vec![xml::XmlRiverDoc {
			title: "no digits here".to_string(),
			passage: String::new(),
		}];
		assert_eq!(score_docs(docs, None), SearchOutcome::default());
	}
}
