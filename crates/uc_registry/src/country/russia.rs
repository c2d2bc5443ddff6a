use uc_cache::IdentityCache;
use uc_config::Country;

use crate::error::Result;
use crate::resolver::{resolve_via_html_scrape, ProxyPool, ResolvedIdentity};

/// Scrapes the Russian company registry's HTML page (`spec.md` §4.5).
/// The one country whose connection failures get a single retry.
pub struct RussiaResolver<'a> {
	pub proxies: &'a ProxyPool,
	pub cache: &'a IdentityCache,
	pub base_url: &'a str,
}

impl<'a> RussiaResolver<'a> {
	pub async fn resolve(&self, taxpayer_id: &str) -> Result<ResolvedIdentity> {
		let url = format!("{}/{taxpayer_id}", self.base_url.trim_end_matches('/'));
		resolve_via_html_scrape(self.proxies, self.cache, Country::Russia, &url, taxpayer_id, true).await
	}
}
