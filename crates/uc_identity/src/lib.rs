mod error;

pub use error::{Error, Result};

use once_cell::sync::Lazy;
use regex::Regex;
use uc_cache::IdentityCache;
use uc_config::{Country, LabelCatalog, RegistryConfig, SearchConfig};
use uc_registry::{BelarusResolver, KazakhstanResolver, NoopTranslator, ProxyPool, RussiaResolver, UzbekistanResolver};
use uc_search::SearchEngineResolver;
use uc_sheet::Header;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Drives `spec.md` §4.8 step 4 for one header: resolving the seller
/// and buyer party blocks to taxpayer IDs and canonical company
/// details, then normalizing `destination_station`.
pub struct IdentityEnricher<'a> {
	proxies: ProxyPool,
	cache: &'a IdentityCache,
	registry: &'a RegistryConfig,
	search: SearchEngineResolver<'a>,
	translator: NoopTranslator,
}

/// The two party roles the enricher resolves. Each draws its free text
/// from the primary field, falling back to the "priority" field
/// harvested from a second label span (`spec.md` §4.3.4).
const PARTIES: [(&str, [&str; 2]); 2] = [("seller", ["seller", "seller_priority"]), ("buyer", ["buyer", "buyer_priority"])];

impl<'a> IdentityEnricher<'a> {
	pub fn new(cache: &'a IdentityCache, registry: &'a RegistryConfig, search_config: &'a SearchConfig) -> Result<Self> {
		let proxies = ProxyPool::new(&registry.proxies, registry.timeout)?;
		let search = SearchEngineResolver::new(cache, search_config)?;
		Ok(Self {
			proxies,
			cache,
			registry,
			search,
			translator: NoopTranslator,
		})
	}

	/// Enriches `header` in place. Absent party text is skipped
	/// silently; a party whose text yields no validated or
	/// search-resolved ID is left unenriched rather than erroring, since
	/// partial enrichment is allowed to stand (`spec.md` §5).
	pub async fn enrich(&self, header: &mut Header, catalog: &LabelCatalog) -> Result<()> {
		for (role, name_fields) in PARTIES {
			self.enrich_party(header, role, &name_fields).await?;
		}
		normalize_station(header, catalog);
		Ok(())
	}

	async fn enrich_party(&self, header: &mut Header, role: &str, name_fields: &[&str]) -> Result<()> {
		let Some(party_text) = name_fields.iter().find_map(|field| header.get(*field)).cloned() else {
			return Ok(());
		};

		let embedded = DIGIT_RUN
			.find_iter(&party_text)
			.map(|m| m.as_str())
			.find_map(|candidate| uc_registry::validate_any(candidate).map(|country| (country, candidate.to_string())));

		let (taxpayer_id, country, found_in_invoice) = match embedded {
			Some((country, id)) => (Some(id), Some(country), true),
			None => {
				let outcome = self.search.resolve(&party_text, Some(&party_text)).await?;
				(outcome.taxpayer_id, outcome.country, outcome.found_in_invoice)
			}
		};

		let (Some(taxpayer_id), Some(country)) = (taxpayer_id, country) else {
			return Ok(());
		};

		let identity = self.resolve_registry(country, &taxpayer_id).await?;

		header.insert(format!("{role}_taxpayer_id"), taxpayer_id);
		if let Some(name) = identity.company_name {
			header.insert(format!("{role}_unified"), name);
		}
		if let Some(phone) = identity.phone {
			header.insert(format!("{role}_phone"), phone);
		}
		if let Some(email) = identity.email {
			header.insert(format!("{role}_email"), email);
		}
		header.insert(format!("{role}_found_in_invoice"), found_in_invoice.to_string());
		Ok(())
	}

	async fn resolve_registry(&self, country: Country, taxpayer_id: &str) -> Result<uc_registry::ResolvedIdentity> {
		let identity = match country {
			Country::Russia => {
				RussiaResolver {
					proxies: &self.proxies,
					cache: self.cache,
					base_url: &self.registry.russia_url,
				}
				.resolve(taxpayer_id)
				.await?
			}
			Country::Belarus => {
				BelarusResolver {
					proxies: &self.proxies,
					cache: self.cache,
					base_url: &self.registry.belarus_url,
				}
				.resolve(taxpayer_id)
				.await?
			}
			Country::Kazakhstan => {
				KazakhstanResolver {
					proxies: &self.proxies,
					cache: self.cache,
					company_url: &self.registry.kazakhstan_company_url,
					contacts_url: &self.registry.kazakhstan_contacts_url,
				}
				.resolve(taxpayer_id)
				.await?
			}
			Country::Uzbekistan => {
				UzbekistanResolver {
					proxies: &self.proxies,
					cache: self.cache,
					search_url: &self.registry.uzbekistan_search_url,
					translator: &self.translator,
				}
				.resolve(taxpayer_id)
				.await?
			}
		};
		Ok(identity)
	}
}

/// Normalizes `destination_station` against the configured alias list:
/// case-insensitive substring match, first hit wins (`spec.md` §4.8
/// step 4).
fn normalize_station(header: &mut Header, catalog: &LabelCatalog) {
	let Some(current) = header.get("destination_station").cloned() else {
		return;
	};
	if let Some(replacement) = resolve_station_alias(&current, catalog.station_aliases()) {
		header.insert("destination_station".to_string(), replacement);
	}
}

fn resolve_station_alias(current: &str, aliases: &[(String, String)]) -> Option<String> {
	let lower = current.to_lowercase();
	aliases
		.iter()
		.find(|(substring, _)| lower.contains(&substring.to_lowercase()))
		.map(|(_, replacement)| replacement.clone())
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn resolve_station_alias_is_case_insensitive_and_keeps_first_hit() {
		let aliases = vec![
			("vostochny".to_string(), "Vostochny-1".to_string()),
			("vost".to_string(), "Vost-Other".to_string()),
		];
		assert_eq!(
			resolve_station_alias("VOSTOCHNY STATION", &aliases),
			Some("Vostochny-1".to_string())
		);
	}

	#[test]
	fn resolve_station_alias_returns_none_when_no_substring_matches() {
		let aliases = vec![("novosibirsk".to_string(), "Novosibirsk-Glavny".to_string())];
		assert_eq!(resolve_station_alias("Moscow", &aliases), None);
	}
}
