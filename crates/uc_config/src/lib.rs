mod country;
mod error;
mod fields;
mod labels;
mod settings;

pub use country::Country;
pub use error::{Error, Result};
pub use fields::{
	Role, ADDRESS_CONTINUATION_SLOTS, CANONICAL_FIELDS, DESTINATION_STATION_DOUBLE_LABELS,
	PRIORITY_SHEET_NAMES,
};
pub use labels::LabelCatalog;
pub use settings::{Config, RegistryConfig, RootPaths, SearchConfig};
