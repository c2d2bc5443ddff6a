mod error;

pub use error::{Error, Result};

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use uc_config::Country;

/// A resolved company identity, as stored by either logical table
/// (`spec.md` §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedIdentity {
	pub company_name: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
	pub country: Country,
}

/// Backs `spec.md` §4.7: two logical tables, `cache_taxpayer_id` and
/// `search_engine`, both insert-or-replace on their primary key. Opened
/// once per orchestrator run and shared across the identity-enrichment
/// pipeline; the single connection plus an internal mutex stand in for
/// sqlite's own concurrent-access mode (`spec.md` §5: callers never hold
/// the lock across an HTTP call).
pub struct IdentityCache {
	conn: Mutex<Connection>,
}

impl IdentityCache {
	/// Opens (creating if absent) the sqlite file at `path`, creating the
	/// schema if missing. The parent directory is created lazily.
	pub fn open(path: &Path) -> Result<Self> {
		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent).map_err(Error::CreateDir)?;
			}
		}
		let conn = Connection::open(path)?;
		conn.execute_batch(
			"CREATE TABLE IF NOT EXISTS cache_taxpayer_id (
				taxpayer_id TEXT PRIMARY KEY,
				company_name TEXT,
				phone TEXT,
				email TEXT,
				country TEXT NOT NULL
			);
			CREATE TABLE IF NOT EXISTS search_engine (
				taxpayer_id TEXT PRIMARY KEY,
				company_name TEXT NOT NULL,
				country TEXT NOT NULL
			);",
		)?;
		Ok(Self {
			conn: Mutex::new(conn),
		})
	}

	/// Opens an in-memory cache, used by tests and by orchestrator runs
	/// that opt out of persistence.
	pub fn open_in_memory() -> Result<Self> {
		let conn = Connection::open_in_memory()?;
		conn.execute_batch(
			"CREATE TABLE cache_taxpayer_id (
				taxpayer_id TEXT PRIMARY KEY,
				company_name TEXT,
				phone TEXT,
				email TEXT,
				country TEXT NOT NULL
			);
			CREATE TABLE search_engine (
				taxpayer_id TEXT PRIMARY KEY,
				company_name TEXT NOT NULL,
				country TEXT NOT NULL
			);",
		)?;
		Ok(Self {
			conn: Mutex::new(conn),
		})
	}

	pub fn get_taxpayer(&self, taxpayer_id: &str) -> Result<Option<CachedIdentity>> {
		let conn = self.conn.lock().expect("identity cache mutex poisoned");
		conn.query_row(
			"SELECT company_name, phone, email, country FROM cache_taxpayer_id WHERE taxpayer_id = ?1",
			params![taxpayer_id],
			|row| {
				let country: String = row.get(3)?;
				Ok(CachedIdentity {
					company_name: row.get(0)?,
					phone: row.get(1)?,
					email: row.get(2)?,
					country: Country::parse(&country).unwrap_or(Country::Russia),
				})
			},
		)
		.optional()
		.map_err(Error::from)
	}

	pub fn put_taxpayer(&self, taxpayer_id: &str, identity: &CachedIdentity) -> Result<()> {
		let conn = self.conn.lock().expect("identity cache mutex poisoned");
		conn.execute(
			"INSERT OR REPLACE INTO cache_taxpayer_id (taxpayer_id, company_name, phone, email, country)
			 VALUES (?1, ?2, ?3, ?4, ?5)",
			params![
				taxpayer_id,
				identity.company_name,
				identity.phone,
				identity.email,
				identity.country.as_str()
			],
		)?;
		Ok(())
	}

	/// `taxpayer_id` here holds the cleaned free-text query; the returned
	/// `String` is the resolver's chosen candidate ID (`spec.md` §4.7).
	pub fn get_search(&self, cleaned_query: &str) -> Result<Option<(String, Country)>> {
		let conn = self.conn.lock().expect("identity cache mutex poisoned");
		let row: Option<(String, String)> = conn
			.query_row(
				"SELECT company_name, country FROM search_engine WHERE taxpayer_id = ?1",
				params![cleaned_query],
				|row| Ok((row.get(0)?, row.get(1)?)),
			)
			.optional()?;
		Ok(row.map(|(id, country)| (id, Country::parse(&country).unwrap_or(Country::Russia))))
	}

	pub fn put_search(&self, cleaned_query: &str, taxpayer_id: &str, country: Country) -> Result<()> {
		let conn = self.conn.lock().expect("identity cache mutex poisoned");
		conn.execute(
			"INSERT OR REPLACE INTO search_engine (taxpayer_id, company_name, country) VALUES (?1, ?2, ?3)",
			params![cleaned_query, taxpayer_id, country.as_str()],
		)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn taxpayer_round_trips_and_overwrites() {
		let cache = IdentityCache::open_in_memory().unwrap();
		assert_eq!(cache.get_taxpayer("7707083893").unwrap(), None);

		let identity = CachedIdentity {
			company_name: Some("Sberbank".to_string()),
			phone: Some("+7 495 500-55-50".to_string()),
			email: None,
			country: Country::Russia,
		};
		cache.put_taxpayer("7707083893", &identity).unwrap();
		assert_eq!(cache.get_taxpayer("7707083893").unwrap(), Some(identity));

		let replacement = CachedIdentity {
			company_name: Some("Sberbank PJSC".to_string()),
			phone: None,
			email: Some("info@sberbank.ru".to_string()),
			country: Country::Russia,
		};
		cache.put_taxpayer("7707083893", &replacement).unwrap();
		assert_eq!(cache.get_taxpayer("7707083893").unwrap(), Some(replacement));
	}

	#[test]
	fn search_engine_table_keys_on_cleaned_query() {
		let cache = IdentityCache::open_in_memory().unwrap();
		cache.put_search("acme trading", "123456789012", Country::Kazakhstan).unwrap();
		assert_eq!(
			cache.get_search("acme trading").unwrap(),
			Some(("123456789012".to_string(), Country::Kazakhstan))
		);
		assert_eq!(cache.get_search("unknown").unwrap(), None);
	}

	#[test]
	fn opening_creates_parent_directory() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("cache.db");
		let cache = IdentityCache::open(&path).unwrap();
		cache
			.put_search("acme", "000", Country::Belarus)
			.unwrap();
		assert!(path.exists());
	}
}
