use once_cell::sync::Lazy;
use regex::Regex;
use uc_cache::{CachedIdentity, IdentityCache};
use uc_config::Country;

use crate::error::Result;
use crate::resolver::{fetch_html, strip_tags, ProxyPool, ResolvedIdentity, TEL_ANCHOR};

/// Translates a company name from Uzbek to Russian. On failure the
/// original name is kept (`spec.md` §4.5).
pub trait Translator {
	fn translate_uz_to_ru(&self, text: &str) -> Option<String>;
}

/// A translator that never succeeds, used when no translation backend
/// is configured; callers fall back to the original name.
pub struct NoopTranslator;

impl Translator for NoopTranslator {
	fn translate_uz_to_ru(&self, _text: &str) -> Option<String> {
		None
	}
}

static CARD_LINK: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"(?s)<a[^>]*class=["'][^"']*card[^"']*["'][^>]*href=["']([^"']+)["']"#).unwrap());
static H1_SEO: Lazy<Regex> =
	Lazy::new(|| Regex::new(r#"(?s)<h1[^>]*class=["'][^"']*h1-seo[^"']*["'][^>]*>(.*?)</h1>"#).unwrap());
static CFEMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-cfemail=["']([0-9a-fA-F]+)["']"#).unwrap());

/// Searches the Uzbek company registry, follows the first result card,
/// and scrapes its contact details (`spec.md` §4.5). Email addresses
/// are obfuscated behind Cloudflare's email-protection encoding and
/// must be decoded before use.
pub struct UzbekistanResolver<'a> {
	pub proxies: &'a ProxyPool,
	pub cache: &'a IdentityCache,
	pub search_url: &'a str,
	pub translator: &'a dyn Translator,
}

impl<'a> UzbekistanResolver<'a> {
	pub async fn resolve(&self, taxpayer_id: &str) -> Result<ResolvedIdentity> {
		if let Some(cached) = self.cache.get_taxpayer(taxpayer_id)? {
			return Ok(cached.into());
		}

		let search_url = format!("{}?q={taxpayer_id}", self.search_url);
		let search_html = match fetch_html(self.proxies, &search_url).await {
			Ok(html) => html,
			Err(err) => {
				tracing::warn!(error = %err, "uzbekistan registry search failed");
				return Ok(ResolvedIdentity::default());
			}
		};

		let Some(card_url) = CARD_LINK.captures(&search_html).map(|c| c[1].to_string()) else {
			return Ok(ResolvedIdentity::default());
		};

		let card_html = match fetch_html(self.proxies, &card_url).await {
			Ok(html) => html,
			Err(err) => {
				tracing::warn!(error = %err, "uzbekistan registry card fetch failed");
				return Ok(ResolvedIdentity::default());
			}
		};

		let original_name = H1_SEO.captures(&card_html).map(|c| strip_tags(&c[1]));
		let company_name = original_name
			.as_deref()
			.and_then(|name| self.translator.translate_uz_to_ru(name))
			.or(original_name);
		let phone = TEL_ANCHOR.captures(&card_html).map(|c| c[1].to_string());
		let email = CFEMAIL.captures(&card_html).and_then(|c| decode_cfemail(&c[1]));

		let identity = ResolvedIdentity {
			company_name,
			phone,
			email,
		};
		self.cache.put_taxpayer(
			taxpayer_id,
			&CachedIdentity {
				company_name: identity.company_name.clone(),
				phone: identity.phone.clone(),
				email: identity.email.clone(),
				country: Country::Uzbekistan,
			},
		)?;
		Ok(identity)
	}
}

/// Cloudflare's `data-cfemail` obfuscation: the first byte is an XOR
/// key applied to every remaining byte.
fn decode_cfemail(hex: &str) -> Option<String> {
	if hex.len() < 2 || hex.len() % 2 != 0 {
		return None;
	}
	let bytes = (0..hex.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
		.collect::<std::result::Result<Vec<u8>, _>>()
		.ok()?;
	let (key, payload) = bytes.split_first()?;
	let decoded: Vec<u8> = payload.iter().map(|b| b ^ key).collect();
	String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn decodes_cloudflare_obfuscated_email() {
		// "a@b.co" XORed with key 0x2a.
		let plain = b"a@b.co";
		let key = 0x2au8;
		let encoded: String = std::iter::once(key)
			.chain(plain.iter().map(|b| b ^ key))
			.map(|b| format!("{b:02x}"))
			.collect();
		assert_eq!(decode_cfemail(&encoded).as_deref(), Some("a@b.co"));
	}

	#[test]
	fn rejects_malformed_hex() {
		assert_eq!(decode_cfemail("zz"), None);
		assert_eq!(decode_cfemail("a"), None);
	}
}
