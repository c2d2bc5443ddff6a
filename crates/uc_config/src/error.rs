#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing required environment variable {0}")]
	MissingEnv(String),

	#[error("missing sheet \"{0}\" in configuration workbook")]
	MissingSheet(String),

	#[error("configuration workbook has no column for canonical field \"{0}\"")]
	MissingColumn(String),

	#[error("failed to read configuration workbook: {0}")]
	Workbook(String),

	#[error(transparent)]
	Figment(#[from] figment::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
