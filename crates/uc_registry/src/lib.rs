mod country;
mod error;
mod resolver;
mod validator;

pub use country::{BelarusResolver, KazakhstanResolver, NoopTranslator, RussiaResolver, Translator, UzbekistanResolver};
pub use error::{Error, Result};
pub use resolver::{ProxyPool, ResolvedIdentity};
pub use validator::{validate, validate_any};
