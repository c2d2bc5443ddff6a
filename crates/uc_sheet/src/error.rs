#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The party-completeness invariant (`spec.md` §4.3.1) failed when a
	/// header row was detected: the sheet is missing a seller, a buyer,
	/// or a destination station.
	#[error("party-completeness invariant failed: {0}")]
	PartyCompleteness(String),

	/// A row matched the table-start heuristic but the sheet has no
	/// recorded column for `tnved_code` to read the code from.
	#[error("row {0} looks like a line item but no tnved_code column is known")]
	TnvedMissing(usize),

	/// The sheet produced no line items at all.
	#[error("sheet produced no line items")]
	Empty,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
