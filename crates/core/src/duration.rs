//! Track duration wire format.
//!
//! Durations are stored as whole seconds and exchanged over JSON as the
//! string `"<n> seconds"`, e.g. `"215 seconds"`.

use crate::types::DurationSecs;

/// Unit suffix of the textual form.
pub const UNIT: &str = "seconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration format, expected \"<n> seconds\"")]
pub struct InvalidDurationFormat;

/// Render seconds as `"<n> seconds"`.
pub fn format_seconds(secs: DurationSecs) -> String {
    format!("{secs} {UNIT}")
}

/// Parse `"<n> seconds"` into a non-negative number of seconds.
///
/// # Examples
///
/// ```
/// use spookify_core::duration::parse_seconds;
/// assert_eq!(parse_seconds("215 seconds"), Ok(215));
/// assert!(parse_seconds("215").is_err());
/// ```
pub fn parse_seconds(text: &str) -> Result<DurationSecs, InvalidDurationFormat> {
    let mut parts = text.split(' ');
    let (Some(amount), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InvalidDurationFormat);
    };
    if unit != UNIT {
        return Err(InvalidDurationFormat);
    }
    match amount.parse::<DurationSecs>() {
        Ok(secs) if secs >= 0 => Ok(secs),
        _ => Err(InvalidDurationFormat),
    }
}

/// `#[serde(with = "seconds_text")]` for `DurationSecs` fields.
pub mod seconds_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::types::DurationSecs;

    pub fn serialize<S: Serializer>(secs: &DurationSecs, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_seconds(*secs))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DurationSecs, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_seconds(&text).map_err(de::Error::custom)
    }
}

/// `#[serde(default, with = "option_seconds_text")]` for optional fields in
/// partial-update payloads.
pub mod option_seconds_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::types::DurationSecs;

    pub fn serialize<S: Serializer>(
        secs: &Option<DurationSecs>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match secs {
            Some(secs) => serializer.serialize_str(&super::format_seconds(*secs)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DurationSecs>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| super::parse_seconds(&text).map_err(de::Error::custom))
            .transpose()
    }
}
