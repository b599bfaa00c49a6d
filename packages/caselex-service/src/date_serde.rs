pub mod option;

use serde::Serializer;
use time::Date;

use caselex_domain::date::ISO_DATE;

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(ISO_DATE).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}
