use uc_cache::IdentityCache;
use uc_config::Country;

use crate::error::Result;
use crate::resolver::{resolve_via_html_scrape, ProxyPool, ResolvedIdentity};

/// Scrapes the Belarusian company registry using the identical HTML
/// scraping strategy as [`crate::RussiaResolver`] (`spec.md` §4.5).
/// `original_source`'s `UnifiedBelarusCompanies.get_company_by_taxpayer_id`
/// delegates outright to `UnifiedRussianCompanies` for this reason; this
/// resolver reuses the shared scraper rather than duplicating it, but
/// does not get Russia's single connection retry.
pub struct BelarusResolver<'a> {
	pub proxies: &'a ProxyPool,
	pub cache: &'a IdentityCache,
	pub base_url: &'a str,
}

impl<'a> BelarusResolver<'a> {
	pub async fn resolve(&self, taxpayer_id: &str) -> Result<ResolvedIdentity> {
		let url = format!("{}/{taxpayer_id}", self.base_url.trim_end_matches('/'));
		resolve_via_html_scrape(self.proxies, self.cache, Country::Belarus, &url, taxpayer_id, false).await
	}
}
