//! Record codec shared by the disk backend and the snapshot format.
//!
//! Records are msgpack maps (struct fields keyed by name). Timestamps do not
//! have a native msgpack representation, so they are wrapped in a single-key
//! tagged map `{"__datetime__": <RFC 3339 string>}`, which survives
//! round-trips with timezone intact.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Encode a record as a msgpack map.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    rmp_serde::encode::to_vec_named(value).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decode a record previously produced by [`encode`].
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, StoreError> {
    rmp_serde::decode::from_slice(raw).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Serde adapter for timestamp fields: `{"__datetime__": "<ISO-8601>"}`.
///
/// Apply with `#[serde(with = "jobq_core::codec::datetime_tag")]`.
pub mod datetime_tag {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Tagged {
        #[serde(rename = "__datetime__")]
        iso: String,
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged {
            iso: dt.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let tagged = Tagged::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&tagged.iso)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        name: String,
        #[serde(with = "datetime_tag")]
        at: DateTime<Utc>,
    }

    fn sample() -> Stamped {
        Stamped {
            name: "x".to_string(),
            at: Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 45).unwrap(),
        }
    }

    #[test]
    fn records_round_trip() {
        let original = sample();
        let raw = encode(&original).unwrap();
        let back: Stamped = decode(&raw).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode(&sample()).unwrap();
        let b = encode(&sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn timestamps_are_tagged_iso_strings() {
        let raw = encode(&sample()).unwrap();
        let as_bytes = String::from_utf8_lossy(&raw);
        assert!(as_bytes.contains("__datetime__"));
        assert!(as_bytes.contains("2024-05-17T12:30:45"));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = decode::<Stamped>(b"definitely not msgpack").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
