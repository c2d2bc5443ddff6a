#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to open workbook: {0}")]
	Open(String),

	#[error("sheet {0:?} not found")]
	MissingSheet(String),

	#[error("workbook has no sheets")]
	NoSheets,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
