use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Filesystem layout rooted at `XL_IDP_ROOT_UNZIPPING` (`spec.md` §6).
#[derive(Debug, Clone)]
pub struct RootPaths {
	pub root: PathBuf,
	pub input: PathBuf,
}

impl RootPaths {
	pub fn config_workbook(&self) -> PathBuf {
		self.root.join("unzipping_table.xlsx")
	}

	pub fn archives(&self) -> PathBuf {
		self.root.join("archives")
	}

	pub fn json(&self) -> PathBuf {
		self.root.join("json")
	}

	pub fn done(&self) -> PathBuf {
		self.root.join("done")
	}

	pub fn done_excel(&self) -> PathBuf {
		self.root.join("done_excel")
	}

	pub fn errors_excel(&self) -> PathBuf {
		self.root.join("errors_excel")
	}

	pub fn errors(&self) -> PathBuf {
		self.root.join("errors")
	}

	pub fn cache_db(&self) -> PathBuf {
		self.root.join("cache").join("cache.db")
	}

	pub fn logging_dir(&self) -> PathBuf {
		self.root.join("logging")
	}
}

/// `registry.*` table: per-call timeout, optional round-robin proxy
/// pool, and the concrete upstream endpoints shared by every
/// `RegistryResolver` (`spec.md` §4.5, §5). The spec treats the exact
/// endpoints as an external contract rather than something to hardcode,
/// so they are configuration, not constants.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
	#[serde(with = "humantime_secs", default = "default_timeout")]
	pub timeout: Duration,
	#[serde(default)]
	pub proxies: Vec<String>,
	#[serde(default)]
	pub russia_url: String,
	#[serde(default)]
	pub belarus_url: String,
	#[serde(default)]
	pub kazakhstan_company_url: String,
	#[serde(default)]
	pub kazakhstan_contacts_url: String,
	#[serde(default)]
	pub uzbekistan_search_url: String,
}

/// `search.*` table: xml-river credentials and retry policy for the
/// search-engine fallback (`spec.md` §4.6).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
	pub user: String,
	pub key: String,
	pub endpoint: String,
	#[serde(with = "humantime_secs", default = "default_timeout")]
	pub timeout: Duration,
	#[serde(default = "default_attempts")]
	pub attempts: u32,
	#[serde(with = "humantime_secs", default = "default_retry_sleep")]
	pub retry_sleep: Duration,
}

fn default_timeout() -> Duration {
	Duration::from_secs(120)
}

fn default_attempts() -> u32 {
	3
}

fn default_retry_sleep() -> Duration {
	Duration::from_secs(60)
}

mod humantime_secs {
	use super::Duration;
	use serde::{Deserialize, Deserializer};

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		let secs = u64::deserialize(deserializer)?;
		Ok(Duration::from_secs(secs))
	}
}

/// Top-level configuration, assembled the way the teacher assembles its
/// own: a layered `Figment` (TOML file + environment), extracted once at
/// startup.
#[derive(Debug, Clone)]
pub struct Config {
	pub paths: RootPaths,
	pub registry: RegistryConfig,
	pub search: SearchConfig,
}

#[derive(Debug, Deserialize)]
struct FileConfig {
	#[serde(default)]
	registry: RegistryConfig,
	search: SearchConfig,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		RegistryConfig {
			timeout: default_timeout(),
			proxies: Vec::new(),
			russia_url: String::new(),
			belarus_url: String::new(),
			kazakhstan_company_url: String::new(),
			kazakhstan_contacts_url: String::new(),
			uzbekistan_search_url: String::new(),
		}
	}
}

impl Config {
	/// Loads `unzipping.toml` (if present) merged over environment
	/// variables, and resolves the two mandatory path variables. Missing
	/// `XL_IDP_ROOT_UNZIPPING` / `XL_IDP_PATH_UNZIPPING` is a fatal
	/// `ConfigError` (`spec.md` §6, §7).
	pub fn load() -> Result<Self> {
		let root = env_var("XL_IDP_ROOT_UNZIPPING")?;
		let input = env_var("XL_IDP_PATH_UNZIPPING")?;

		let figment = Figment::new()
			.merge(Toml::file("unzipping.toml"))
			.merge(Env::prefixed("UC_").split("_"));
		let file_config: FileConfig = figment.extract()?;

		Ok(Self {
			paths: RootPaths {
				root: PathBuf::from(root),
				input: PathBuf::from(input),
			},
			registry: file_config.registry,
			search: file_config.search,
		})
	}
}

fn env_var(name: &str) -> Result<String> {
	std::env::var(name).map_err(|_| Error::MissingEnv(name.to_string()))
}
