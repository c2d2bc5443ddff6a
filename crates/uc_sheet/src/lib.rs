mod columns;
mod decoder;
mod error;
mod record;
mod scorer;

pub use columns::ColumnPositions;
pub use decoder::SheetDecoder;
pub use error::{Error, Result};
pub use record::{Header, ShipmentRecord};
pub use scorer::{qualifies, score_row, HeaderScore, HEADER_PROBABILITY_COEFFICIENT, MIN_HEADER_CELLS};
