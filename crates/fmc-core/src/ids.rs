//! Identifier wrappers for FMC resources.
//!
//! Domains are addressed by UUID. Object identifiers are opaque strings
//! assigned by the FMC; they look like UUIDs but their case is significant to
//! some endpoints, so they are kept verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed UUID wrapper types.
macro_rules! uuid_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new UUID wrapper from a [`Uuid`].
            #[must_use]
            pub const fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Creates a new random UUID (v4).
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the inner [`Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parses a UUID from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a valid UUID.
            pub fn parse_str(input: &str) -> Result<Self> {
                Uuid::parse_str(input.trim())
                    .map(Self)
                    .map_err(|_| Error::InvalidId(input.to_string()))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_type!(DomainUuid, "FMC domain UUID (scopes every config URL)");

/// Opaque identifier of an FMC object, policy, rule or device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse an identifier, rejecting values that cannot be used as a URL
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, is a `.` or `..` segment, or
    /// contains `/`, `?`, `#` or whitespace.
    pub fn parse_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(Error::InvalidId(input.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse_str(value)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_str(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_UUID: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";
    const FMC_OBJECT_ID: &str = "00505686-3A94-0ed3-0000-004294968218";

    #[test]
    fn test_domain_uuid_parse_valid() {
        let domain = DomainUuid::parse_str(VALID_UUID).unwrap();
        assert_eq!(domain.to_string(), VALID_UUID);
    }

    #[test]
    fn test_domain_uuid_parse_invalid() {
        let err = DomainUuid::parse_str("global").unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));
    }

    #[test]
    fn test_domain_uuid_serde_transparent() {
        let domain = DomainUuid::parse_str(VALID_UUID).unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, format!("\"{VALID_UUID}\""));
    }

    #[test]
    fn test_object_id_preserves_case() {
        let id = ObjectId::parse_str(FMC_OBJECT_ID).unwrap();
        assert_eq!(id.as_str(), FMC_OBJECT_ID);
        assert_eq!(id.to_string(), FMC_OBJECT_ID);
    }

    #[test]
    fn test_object_id_rejects_path_characters() {
        assert!(ObjectId::parse_str("").is_err());
        assert!(ObjectId::parse_str("   ").is_err());
        assert!(ObjectId::parse_str("abc/def").is_err());
        assert!(ObjectId::parse_str("abc?x=1").is_err());
        assert!(ObjectId::parse_str("has space").is_err());
        assert!(ObjectId::parse_str("..").is_err());
        assert!(ObjectId::parse_str(".").is_err());
    }

    #[test]
    fn test_object_id_deserializes_from_string() {
        let id: ObjectId = serde_json::from_str(&format!("\"{FMC_OBJECT_ID}\"")).unwrap();
        assert_eq!(id.as_str(), FMC_OBJECT_ID);
    }

    #[test]
    fn test_object_id_deserialize_validates() {
        for bad in ["\"a/b\"", "\" \"", "\"\"", "\"../../x y\"", "\"..\"", "\"x?y=1\""] {
            let result: std::result::Result<ObjectId, _> = serde_json::from_str(bad);
            assert!(result.is_err(), "{bad} should not deserialize");
        }
    }

    #[test]
    fn test_object_id_serializes_as_plain_string() {
        let id = ObjectId::parse_str(FMC_OBJECT_ID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{FMC_OBJECT_ID}\""));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
