/// The eleven canonical line-item fields the `headers_table` sheet of the
/// configuration workbook enumerates columns for.
pub const CANONICAL_FIELDS: [&str; 11] = [
	"model",
	"number_pp",
	"tnved_code",
	"country_of_origin",
	"goods_description",
	"quantity",
	"package_quantity",
	"net_weight",
	"gross_weight",
	"price_per_piece",
	"total_cost",
];

/// The six pre-table party/station roles the `labels_before_table` sheet
/// enumerates columns for, in the order the orchestrator reads them
/// positionally (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
	Seller,
	SellerPriority,
	Buyer,
	BuyerPriority,
	DestinationStation,
	DepartureStation,
}

impl Role {
	pub const ORDERED: [Role; 6] = [
		Role::Seller,
		Role::SellerPriority,
		Role::Buyer,
		Role::BuyerPriority,
		Role::DestinationStation,
		Role::DepartureStation,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Role::Seller => "seller",
			Role::SellerPriority => "seller_priority",
			Role::Buyer => "buyer",
			Role::BuyerPriority => "buyer_priority",
			Role::DestinationStation => "destination_station",
			Role::DepartureStation => "departure_station",
		}
	}
}

/// Sheet names whose presence in a workbook, as a case-sensitive
/// substring, makes that sheet the preferred one when a workbook has
/// multiple sheets (`spec.md` §4.8 step 1). Carried over verbatim from
/// the original implementation's `PRIORITY_SHEETS` constant rather than
/// loaded from the configuration workbook, which only supplies the
/// label/header/station synonym tables.
pub const PRIORITY_SHEET_NAMES: &[&str] = &[
	"INVOICE- SPECIFICATION",
	"INVOICE CPT SVILENGRAD",
	"Proforma Invoice",
	"ИНВ-проформа Китай",
	"Спецификация PR",
	"инвойс спецификация",
	"проф",
	"Проформа",
	"спецификаци",
	"спецификаци-1",
	"спецификация",
	"инв-спецификация",
	"инвойс",
];

/// Literal label text that marks the second of a pair of identically
/// labelled address cells (`spec.md` §4.3.4(c)) as the destination
/// station.
pub const DESTINATION_STATION_DOUBLE_LABELS: &[&str] =
	&["Address/ Адрес/ 地址", "Address/ Адрес/ "];

/// Maps the running occurrence count of a
/// [`DESTINATION_STATION_DOUBLE_LABELS`] literal to the role slot whose
/// value the following non-null cell should be appended to, supporting
/// multi-line address continuations. Index `2` (the third occurrence,
/// which the original calls the buyer's short label) intentionally has
/// no continuation slot (`spec.md` §9, Open Question 2).
pub const ADDRESS_CONTINUATION_SLOTS: &[(u32, Role)] = &[
	(1, Role::Seller),
	(3, Role::SellerPriority),
	(4, Role::BuyerPriority),
];
