#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to create cache directory")]
	CreateDir(#[source] std::io::Error),

	#[error(transparent)]
	Sqlite(#[from] rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
