#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Xml(#[from] quick_xml::Error),

	#[error(transparent)]
	Cache(#[from] uc_cache::Error),

	#[error("search engine reported a fatal error (code {0})")]
	Fatal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
