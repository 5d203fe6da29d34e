//! Serde helpers for human-readable program durations.
//!
//! Durations serialize as humantime strings (`"1h 30m"`) and deserialize from
//! either a number of seconds or a humantime string.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let duration_str = humantime::format_duration(*duration).to_string();
    serializer.serialize_str(&duration_str)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str(
                "a duration as seconds (number) or human-readable string (e.g., '45m', '1h30m')",
            )
        }

        fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(seconds))
        }

        fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(seconds)
                .map(Duration::from_secs)
                .map_err(|_| de::Error::custom(format!("Duration cannot be negative: {seconds}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(value)
                .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        duration: Duration,
    }

    #[test]
    fn accepts_seconds_and_humantime() {
        let from_number: Wrapper = serde_json::from_str(r#"{"duration": 3600}"#).unwrap();
        let from_text: Wrapper = serde_json::from_str(r#"{"duration": "1h 30m"}"#).unwrap();

        assert_eq!(from_number.duration, Duration::from_secs(3600));
        assert_eq!(from_text.duration, Duration::from_secs(5400));
    }

    #[test]
    fn rejects_negative_seconds() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"duration": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_humantime() {
        let json = serde_json::to_string(&Wrapper {
            duration: Duration::from_secs(3660),
        })
        .unwrap();
        assert_eq!(json, r#"{"duration":"1h 1m"}"#);
    }
}
