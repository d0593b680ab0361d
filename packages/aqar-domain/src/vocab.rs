//! Append-only vocabulary tables. Lookups are exact-match on lowercased
//! words; no fuzzy matching. Ids must never be renumbered because indexed
//! documents and profile histograms reference them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
	Buy,
	Rent,
}

impl Purpose {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Buy => "buy",
			Self::Rent => "rent",
		}
	}
}

/// Query words that map to a property type id. Plural forms are spelled out
/// because matching is exact.
const PROPERTY_TYPES: &[(&str, i32)] = &[
	("apartment", 1),
	("apartments", 1),
	("flat", 1),
	("flats", 1),
	("villa", 2),
	("villas", 2),
	("townhouse", 3),
	("townhouses", 3),
	("penthouse", 4),
	("penthouses", 4),
	("duplex", 5),
	("duplexes", 5),
];

/// Query phrases that map to a canonical feature key. Multi-word phrases
/// must precede their single-word fallbacks so the longest form wins.
const FEATURES: &[(&str, &str)] = &[
	("swimming pool", "swimming_pool"),
	("private pool", "swimming_pool"),
	("shared pool", "swimming_pool"),
	("pool", "swimming_pool"),
	("maids room", "maids_room"),
	("maid's room", "maids_room"),
	("maid room", "maids_room"),
	("sea view", "sea_view"),
	("beach access", "beach_access"),
	("covered parking", "parking"),
	("parking", "parking"),
	("gym", "gym"),
	("balcony", "balcony"),
	("garden", "garden"),
	("furnished", "furnished"),
	("unfurnished", "unfurnished"),
	("pet friendly", "pet_friendly"),
];

/// Primary-store feature ids and their canonical keys, used when projecting
/// rows into search documents.
const FEATURE_IDS: &[(i32, &str)] = &[
	(1, "swimming_pool"),
	(2, "gym"),
	(3, "balcony"),
	(4, "parking"),
	(5, "garden"),
	(6, "maids_room"),
	(7, "furnished"),
	(8, "sea_view"),
	(9, "beach_access"),
	(10, "pet_friendly"),
	(11, "unfurnished"),
];

const PURPOSES: &[(&str, Purpose)] = &[
	("for sale", Purpose::Buy),
	("for rent", Purpose::Rent),
	("to rent", Purpose::Rent),
	("to buy", Purpose::Buy),
	("buy", Purpose::Buy),
	("purchase", Purpose::Buy),
	("sale", Purpose::Buy),
	("rent", Purpose::Rent),
	("rental", Purpose::Rent),
	("rentals", Purpose::Rent),
	("lease", Purpose::Rent),
];

const STOPWORDS: &[&str] = &[
	"a", "an", "the", "and", "or", "of", "to", "with", "for", "me", "my", "show", "find", "want",
	"wanted", "looking", "need", "please", "property", "properties", "home", "homes",
];

pub fn property_type_words() -> &'static [(&'static str, i32)] {
	PROPERTY_TYPES
}

pub fn feature_phrases() -> &'static [(&'static str, &'static str)] {
	FEATURES
}

pub fn purpose_phrases() -> &'static [(&'static str, Purpose)] {
	PURPOSES
}

pub fn property_type_id(word: &str) -> Option<i32> {
	PROPERTY_TYPES.iter().find(|(entry, _)| *entry == word).map(|(_, id)| *id)
}

pub fn feature_key(phrase: &str) -> Option<&'static str> {
	FEATURES.iter().find(|(entry, _)| *entry == phrase).map(|(_, key)| *key)
}

pub fn feature_key_for_id(id: i32) -> Option<&'static str> {
	FEATURE_IDS.iter().find(|(entry, _)| *entry == id).map(|(_, key)| *key)
}

pub fn is_stopword(word: &str) -> bool {
	STOPWORDS.contains(&word)
}
