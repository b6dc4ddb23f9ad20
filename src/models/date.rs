//! Wire date convention used by the library server
//!
//! Dates travel as `yyyy-MM-dd HH:mm:ss` without an offset and are always
//! expressed in the library's own time zone (UTC+08:00), never the caller's.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Format of every date field on the wire
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset of the library's time zone, in seconds east of UTC
pub const LIBRARY_UTC_OFFSET_SECONDS: i32 = 8 * 3600;

/// Timestamp as the library reports it
pub type LibraryDateTime = DateTime<FixedOffset>;

/// The library's fixed time zone
pub fn library_offset() -> FixedOffset {
    FixedOffset::east_opt(LIBRARY_UTC_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Parse a wire date string
pub fn parse(value: &str) -> Result<LibraryDateTime, String> {
    let naive = NaiveDateTime::parse_from_str(value, WIRE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {}", value, e))?;
    library_offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous date '{}'", value))
}

/// Render a timestamp in the wire format, converted to library time
pub fn format(value: &LibraryDateTime) -> String {
    value.with_timezone(&library_offset()).format(WIRE_FORMAT).to_string()
}

/// `#[serde(with = "wire")]` for required dates
pub mod wire {
    use super::*;

    pub fn serialize<S: Serializer>(value: &LibraryDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LibraryDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }
}

/// `#[serde(with = "wire_option")]` for nullable dates
pub mod wire_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<LibraryDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&format(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<LibraryDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(de::Error::custom))
            .transpose()
    }
}
