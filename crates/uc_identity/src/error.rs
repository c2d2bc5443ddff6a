#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Registry(#[from] uc_registry::Error),

	#[error(transparent)]
	Search(#[from] uc_search::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
