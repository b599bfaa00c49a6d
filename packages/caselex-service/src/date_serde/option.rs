use serde::{Deserialize as _, Deserializer, Serializer};
use time::Date;

use caselex_domain::date::parse_iso_date;

pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(value) => crate::date_serde::serialize(value, serializer),
		None => serializer.serialize_none(),
	}
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw {
		Some(value) => parse_iso_date(&value)
			.map(Some)
			.ok_or_else(|| serde::de::Error::custom(format!("Expected an ISO date, got {value:?}."))),
		None => Ok(None),
	}
}
