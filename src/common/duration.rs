//! Serde adapter for optional durations written the way protobuf JSON writes them, e.g. `"60s"` or `"1.5s"`.

use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DurationError {
    #[error("duration {0} must end with 's'")]
    MissingUnit(String),
    #[error("invalid duration {value}: {reason}")]
    Invalid { value: String, reason: String },
}

pub fn format(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        let fraction = format!("{:09}", duration.subsec_nanos());
        format!("{}.{}s", duration.as_secs(), fraction.trim_end_matches('0'))
    }
}

pub fn parse(value: &str) -> Result<Duration, DurationError> {
    let invalid = |reason: String| DurationError::Invalid { value: value.to_owned(), reason };
    let seconds = value.strip_suffix('s').ok_or_else(|| DurationError::MissingUnit(value.to_owned()))?;
    let seconds: f64 = seconds.parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| invalid(e.to_string()))
}

#[allow(clippy::ref_option)]
pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration {
        Some(duration) => serializer.serialize_str(&format(duration)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?.map(|value| parse(&value).map_err(de::Error::custom)).transpose()
}
