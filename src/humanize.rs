//! Human-readable sizes and durations for configuration values
//!
//! Both types accept either a bare integer or a string with a unit suffix
//! (`"100MB"`, `"120s"`, `"1500ms"`), so the same value can come from TOML or
//! from a `PETROCALC__*` environment variable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Split `"100MB"` into `(100, "MB")`; a bare number has an empty unit.
fn split_unit(raw: &str) -> Result<(u64, String), ParseError> {
    let trimmed = raw.trim();
    let pos = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    if pos == 0 {
        return Err(ParseError::InvalidFormat(raw.to_string()));
    }

    let value = trimmed[..pos].parse::<u64>()?;
    Ok((value, trimmed[pos..].trim().to_ascii_lowercase()))
}

/// Byte count, parsed from `"100MB"` style strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_unit(s)?;

        let multiplier: u64 = match unit.as_str() {
            "" | "b" => 1,
            "k" | "kb" | "kib" => 1 << 10,
            "m" | "mb" | "mib" => 1 << 20,
            "g" | "gb" | "gib" => 1 << 30,
            _ => return Err(ParseError::InvalidUnit(unit)),
        };

        value
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

        for (unit, divisor) in UNITS {
            if self.0 >= divisor && self.0 % divisor == 0 {
                return write!(f, "{}{}", self.0 / divisor, unit);
            }
        }

        write!(f, "{}B", self.0)
    }
}

/// Duration with millisecond resolution, parsed from `"120s"` style strings.
///
/// Bare integers are seconds. Serializes back to the shortest exact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for HumanDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_unit(s)?;

        let secs_per_unit: u64 = match unit.as_str() {
            "ms" => return Ok(HumanDuration::from_millis(value)),
            "" | "s" | "sec" | "secs" => 1,
            "m" | "min" | "mins" => 60,
            "h" => 3600,
            "d" => 86_400,
            _ => return Err(ParseError::InvalidUnit(unit)),
        };

        value
            .checked_mul(secs_per_unit)
            .map(HumanDuration::from_secs)
            .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_millis();
        if millis % 1000 != 0 {
            return write!(f, "{}ms", millis);
        }

        let secs = self.0.as_secs();
        if secs != 0 && secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs != 0 && secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Shared visitor: integers come straight from TOML or parsed env vars,
/// strings go through `FromStr`.
struct UnitVisitor<T>(std::marker::PhantomData<T>);

impl<'de, T> serde::de::Visitor<'de> for UnitVisitor<T>
where
    T: FromStr<Err = ParseError>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a string with a unit suffix (e.g. \"100MB\", \"120s\")")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if v < 0 {
            return Err(E::custom(format!("negative value not allowed: {}", v)));
        }
        self.visit_u64(v as u64)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(UnitVisitor(std::marker::PhantomData))
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(UnitVisitor(std::marker::PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sizes() {
        assert_eq!("1024".parse::<ByteSize>().unwrap().as_u64(), 1024);
        assert_eq!("1KB".parse::<ByteSize>().unwrap().as_u64(), 1024);
        assert_eq!("100MB".parse::<ByteSize>().unwrap().as_u64(), 100 * 1024 * 1024);
        assert_eq!("2GiB".parse::<ByteSize>().unwrap().as_u64(), 2 * 1024 * 1024 * 1024);
        assert!("12XB".parse::<ByteSize>().is_err());
        assert!("MB".parse::<ByteSize>().is_err());
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!("120s".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(120));
        assert_eq!("120".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(120));
        assert_eq!("1500ms".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_millis(1500));
        assert_eq!("5m".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(300));
        assert!("10 fortnights".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_overflowing_values_are_errors() {
        assert!(matches!(
            "99999999999GB".parse::<ByteSize>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "999999999999999999d".parse::<HumanDuration>(),
            Err(ParseError::InvalidFormat(_))
        ));
        assert_eq!(
            "18446744073709551615ms".parse::<HumanDuration>().unwrap().as_duration(),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn test_display_round_trips_exact_units() {
        assert_eq!(ByteSize(100 * 1024 * 1024).to_string(), "100MB");
        assert_eq!(ByteSize(1500).to_string(), "1500B");
        assert_eq!(HumanDuration::from_secs(120).to_string(), "2m");
        assert_eq!(HumanDuration::from_secs(90).to_string(), "90s");
        assert_eq!(HumanDuration::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        #[derive(Deserialize)]
        struct Limits {
            size: ByteSize,
            ttl: HumanDuration,
        }

        let parsed: Limits = serde_json::from_str(r#"{"size": "10MB", "ttl": 120}"#).unwrap();
        assert_eq!(parsed.size.as_u64(), 10 * 1024 * 1024);
        assert_eq!(parsed.ttl.as_duration(), Duration::from_secs(120));
    }
}
