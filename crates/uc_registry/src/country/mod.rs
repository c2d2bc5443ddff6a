mod belarus;
mod kazakhstan;
mod russia;
mod uzbekistan;

pub use belarus::BelarusResolver;
pub use kazakhstan::KazakhstanResolver;
pub use russia::RussiaResolver;
pub use uzbekistan::{NoopTranslator, Translator, UzbekistanResolver};
