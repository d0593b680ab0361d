//! RFC 3339 wire form for [`OffsetDateTime`] fields.

use serde::{Deserialize, Deserializer, Serializer, de, ser};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	datetime
		.format(&Rfc3339)
		.map_err(ser::Error::custom)
		.and_then(|text| serializer.serialize_str(&text))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let text = String::deserialize(deserializer)?;

	OffsetDateTime::parse(&text, &Rfc3339)
		.map_err(|err| de::Error::custom(format!("not an RFC 3339 timestamp: {err}")))
}
