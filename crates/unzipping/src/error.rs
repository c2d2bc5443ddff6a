#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] uc_config::Error),

	#[error(transparent)]
	Workbook(#[from] uc_workbook::Error),

	#[error(transparent)]
	Sheet(#[from] uc_sheet::Error),

	#[error(transparent)]
	Identity(#[from] uc_identity::Error),

	#[error(transparent)]
	Cache(#[from] uc_cache::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Failure(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
