use serde::{Serializer, ser::Error as _};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Writes a timestamp as an RFC 3339 string.
pub fn rfc3339<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(S::Error::custom)?;

	serializer.serialize_str(&formatted)
}
