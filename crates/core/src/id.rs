//! Opaque identifiers used across the queue.
//!
//! Identifiers are system-generated strings. Freshly minted ones are UUIDv7
//! hex (time-ordered, so lexicographic order follows creation order), but the
//! domain treats them as opaque: any string a caller hands back is a valid
//! lookup key.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

/// Identifier of a single status report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(String);

/// Identifier of a single uploaded result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(String);

macro_rules! impl_string_id {
    ($t:ty) => {
        impl $t {
            /// Mint a fresh identifier (UUIDv7, time-ordered).
            pub fn random() -> Self {
                Self(Uuid::now_v7().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = core::convert::Infallible;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(value))
            }
        }
    };
}

impl_string_id!(JobId);
impl_string_id!(StatusId);
impl_string_id!(ResultId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        let a = JobId::random();
        let b = JobId::random();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_round_trip_through_strings() {
        let id = JobId::from("some-opaque-id");
        assert_eq!(id.as_str(), "some-opaque-id");
        assert_eq!(id.to_string(), "some-opaque-id");
    }

    #[test]
    fn fresh_ids_sort_in_creation_order() {
        let a = StatusId::random();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = StatusId::random();
        assert!(a < b);
    }
}
