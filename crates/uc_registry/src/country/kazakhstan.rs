use uc_cache::{CachedIdentity, IdentityCache};
use uc_config::Country;

use crate::error::Result;
use crate::resolver::{ProxyPool, ResolvedIdentity};

/// Reads two JSON endpoints (`spec.md` §4.5): `company/{id}` for the
/// name, `contacts/{id}` for phone/email arrays.
pub struct KazakhstanResolver<'a> {
	pub proxies: &'a ProxyPool,
	pub cache: &'a IdentityCache,
	pub company_url: &'a str,
	pub contacts_url: &'a str,
}

impl<'a> KazakhstanResolver<'a> {
	pub async fn resolve(&self, taxpayer_id: &str) -> Result<ResolvedIdentity> {
		if let Some(cached) = self.cache.get_taxpayer(taxpayer_id)? {
			return Ok(cached.into());
		}

		let company_name = fetch_json(self.proxies, &format!("{}/{taxpayer_id}", self.company_url.trim_end_matches('/')))
			.await
			.and_then(|value| value.get("name").and_then(|n| n.as_str()).map(str::to_string));

		let contacts = fetch_json(
			self.proxies,
			&format!("{}/{taxpayer_id}", self.contacts_url.trim_end_matches('/')),
		)
		.await;
		let phone = contacts.as_ref().and_then(|v| join_json_strings(v.get("phones")));
		let email = contacts.as_ref().and_then(|v| join_json_strings(v.get("emails")));

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
				country: Country::Kazakhstan,
			},
		)?;
		Ok(identity)
	}
}

async fn fetch_json(proxies: &ProxyPool, url: &str) -> Option<serde_json::Value> {
	match proxies.next_client().get(url).send().await {
		Ok(response) if response.status().is_success() => response.json::<serde_json::Value>().await.ok(),
		Ok(response) => {
			tracing::warn!(status = %response.status(), url, "kazakhstan registry returned non-2xx");
			None
		}
		Err(err) => {
			tracing::warn!(error = %err, url, "kazakhstan registry request failed");
			None
		}
	}
}

fn join_json_strings(value: Option<&serde_json::Value>) -> Option<String> {
	let joined = value?
		.as_array()?
		.iter()
		.filter_map(|entry| entry.as_str())
		.collect::<Vec<_>>()
		.join("\n");
	if joined.is_empty() {
		None
	} else {
		Some(joined)
	}
}
