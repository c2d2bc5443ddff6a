#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Cache(#[from] uc_cache::Error),

	#[error("failed to configure proxy {0:?}")]
	Proxy(String, #[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
