/// The four national registries `RegistryValidator`/`RegistryResolver`
/// are specialized for (`spec.md` §4.4/§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
	Russia,
	Kazakhstan,
	Belarus,
	Uzbekistan,
}

impl Country {
	pub const ALL: [Country; 4] = [
		Country::Russia,
		Country::Kazakhstan,
		Country::Belarus,
		Country::Uzbekistan,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Country::Russia => "russia",
			Country::Kazakhstan => "kazakhstan",
			Country::Belarus => "belarus",
			Country::Uzbekistan => "uzbekistan",
		}
	}

	pub fn parse(value: &str) -> Option<Country> {
		Country::ALL.into_iter().find(|country| country.as_str() == value)
	}
}

impl std::fmt::Display for Country {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
