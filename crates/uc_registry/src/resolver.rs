use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Proxy};
use uc_cache::{CachedIdentity, IdentityCache};
use uc_config::Country;

use crate::error::{Error, Result};

/// A company identity resolved from a registry or the search engine
/// (`spec.md` §4.5). All fields are `None` when the resolver found
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
	pub company_name: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
}

impl From<CachedIdentity> for ResolvedIdentity {
	fn from(cached: CachedIdentity) -> Self {
		Self {
			company_name: cached.company_name,
			phone: cached.phone,
			email: cached.email,
		}
	}
}

/// Connection errors get one retry after this delay (Russia only;
/// `spec.md` §4.5 failure mode).
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(30);

/// One HTTP client per configured proxy, advanced round-robin
/// (`spec.md` §5: "Proxy pool: round-robin index, advanced per HTTP
/// request; no synchronization required beyond atomic fetch-next").
/// An empty proxy list falls back to a single direct client.
pub struct ProxyPool {
	clients: Vec<Client>,
	next: AtomicUsize,
}

impl ProxyPool {
	pub fn new(proxies: &[String], timeout: Duration) -> Result<Self> {
		let clients = if proxies.is_empty() {
			vec![Client::builder().timeout(timeout).build()?]
		} else {
			proxies
				.iter()
				.map(|proxy| {
					let proxy = Proxy::all(proxy).map_err(|err| Error::Proxy(proxy.clone(), err))?;
					Client::builder().timeout(timeout).proxy(proxy).build().map_err(Error::from)
				})
				.collect::<Result<Vec<_>>>()?
		};
		Ok(Self {
			clients,
			next: AtomicUsize::new(0),
		})
	}

	pub fn next_client(&self) -> &Client {
		let index = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
		&self.clients[index]
	}
}

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap());
pub(crate) static TEL_ANCHOR: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"(?s)<a[^>]*href=["']tel:([^"']+)["'][^>]*>"#).unwrap());
static MAILTO_ANCHOR: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"(?s)<a[^>]*href=["']mailto:([^"']+)["'][^>]*>"#).unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

pub(crate) fn strip_tags(fragment: &str) -> String {
	TAG.replace_all(fragment, "").trim().to_string()
}

fn join_non_empty(values: Vec<String>) -> Option<String> {
	let joined = values
		.into_iter()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.collect::<Vec<_>>()
		.join("\n");
	if joined.is_empty() {
		None
	} else {
		Some(joined)
	}
}

/// Shared HTML scraping strategy for Russia and Belarus (`spec.md`
/// §4.5): company name from the primary heading, phone/email from
/// `tel:`/`mailto:` anchors, newline-joined when there is more than one.
pub(crate) fn scrape_contact_page(html: &str) -> ResolvedIdentity {
	let company_name = HEADING.captures(html).map(|c| strip_tags(&c[1]));
	let phone = join_non_empty(TEL_ANCHOR.captures_iter(html).map(|c| c[1].to_string()).collect());
	let email = join_non_empty(MAILTO_ANCHOR.captures_iter(html).map(|c| c[1].to_string()).collect());
	ResolvedIdentity {
		company_name,
		phone,
		email,
	}
}

/// Fetches `url`, returning an empty body for any non-2xx response
/// (`spec.md` §4.5: "All HTTP non-2xx responses yield null") and
/// propagating only transport-level failures.
pub(crate) async fn fetch_html(proxies: &ProxyPool, url: &str) -> Result<String> {
	let response = proxies.next_client().get(url).send().await?;
	if !response.status().is_success() {
		return Ok(String::new());
	}
	Ok(response.text().await?)
}

/// Consult-cache, fetch, scrape, store flow shared by the Russia and
/// Belarus resolvers (`spec.md` §4.5 steps 1-3; Belarus delegating to
/// the Russian scraping strategy is a supplement drawn from
/// `original_source`'s `UnifiedBelarusCompanies`).
pub(crate) async fn resolve_via_html_scrape(
	proxies: &ProxyPool,
	cache: &IdentityCache,
	country: Country,
	url: &str,
	taxpayer_id: &str,
	retry_once: bool,
) -> Result<ResolvedIdentity> {
	if let Some(cached) = cache.get_taxpayer(taxpayer_id)? {
		return Ok(cached.into());
	}

	let html = match fetch_html(proxies, url).await {
		Ok(html) => html,
		Err(err) if retry_once => {
			tracing::warn!(error = %err, url, "registry request failed, retrying once after 30s");
			tokio::time::sleep(RETRY_DELAY).await;
			match fetch_html(proxies, url).await {
				Ok(html) => html,
				Err(err) => {
					tracing::warn!(error = %err, url, "registry retry failed");
					return Ok(ResolvedIdentity::default());
				}
			}
		}
		Err(err) => {
			tracing::warn!(error = %err, url, "registry request failed");
			return Ok(ResolvedIdentity::default());
		}
	};

	let identity = scrape_contact_page(&html);
	cache.put_taxpayer(
		taxpayer_id,
		&CachedIdentity {
			company_name: identity.company_name.clone(),
			phone: identity.phone.clone(),
			email: identity.email.clone(),
			country,
		},
	)?;
	Ok(identity)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn scrapes_heading_and_contact_anchors() {
		let html = r#"
			<h1 class="org-name">ACME Trading LLC</h1>
			<a href="tel:+74951234567">call</a>
			<a href="mailto:info@acme.example">mail</a>
			<a href="mailto:sales@acme.example">mail</a>
		"#;
		let identity = scrape_contact_page(html);
		assert_eq!(identity.company_name.as_deref(), Some("ACME Trading LLC"));
		assert_eq!(identity.phone.as_deref(), Some("+74951234567"));
		assert_eq!(identity.email.as_deref(), Some("info@acme.example\nsales@acme.example"));
	}

	#[test]
	fn missing_fields_resolve_to_none() {
		let identity = scrape_contact_page("<p>nothing here</p>");
		assert_eq!(identity, ResolvedIdentity::default());
	}
}
