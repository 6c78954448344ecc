//! Shared FMC wire types.
//!
//! This module provides the JSON shapes every resource reuses: object
//! references, server metadata, paging envelopes, and the parsed server
//! version used for feature gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ids::ObjectId;

/// URL prefix of the platform API (authentication, server information).
pub const PLATFORM_PREFIX: &str = "api/fmc_platform/v1";

/// URL prefix of the configuration API (objects, policies, devices).
pub const CONFIG_PREFIX: &str = "api/fmc_config/v1";

/// Which FMC API a resource lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiDomain {
    /// `/api/fmc_platform/v1/...`
    Platform,
    /// `/api/fmc_config/v1/domain/{domain_uuid}/...`
    Config,
}

impl ApiDomain {
    /// Returns the API name as used in log output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ApiDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// FMC software version, ordered for feature gating.
///
/// Parsed from strings such as `"6.6.1 (build 91)"` or `"7.2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl ServerVersion {
    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string reported by the FMC.
    ///
    /// # Errors
    ///
    /// Returns an error if the leading token is not a dotted number.
    pub fn parse(input: &str) -> Result<Self> {
        let token = input
            .split_whitespace()
            .next()
            .ok_or_else(|| Error::ParseError(format!("Empty server version `{input}`")))?;

        let mut parts = [0u32; 3];
        for (slot, piece) in parts.iter_mut().zip(token.split('.')) {
            *slot = piece.parse().map_err(|_| {
                Error::ParseError(format!("Invalid server version `{input}`"))
            })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ServerVersion> for String {
    fn from(version: ServerVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reference to another FMC object (`{"id", "type", "name"}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRef {
    /// Referenced object id.
    pub id: ObjectId,
    /// FMC type name (e.g. `Host`, `SecurityZone`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectRef {
    /// Create a reference from an id and type name.
    #[must_use]
    pub fn new(id: ObjectId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            name: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Inline literal inside a group object (`{"type": "Host", "value": "10.0.0.1"}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Literal {
    /// Literal type (`Host`, `Network`, `Range`, `PortLiteral`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Protocol for port literals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Port for port literals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl Literal {
    /// Create a value literal.
    #[must_use]
    pub fn value(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(value.into()),
            protocol: None,
            port: None,
        }
    }

    /// Create a port literal.
    #[must_use]
    pub fn port(protocol: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            kind: "PortLiteral".to_string(),
            value: None,
            protocol: Some(protocol.into()),
            port: Some(port.into()),
        }
    }
}

/// Named entity inside [`Metadata`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MetadataEntity {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Read-only flag inside [`Metadata`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReadOnly {
    /// Whether the object is read-only.
    #[serde(default)]
    pub state: bool,
}

/// Server-side metadata attached to every returned object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Last modification time.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    /// User that last changed the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_user: Option<MetadataEntity>,
    /// Owning domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<MetadataEntity>,
    /// Read-only marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<ReadOnly>,
    /// Parent type for contained objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
}

/// Paging envelope returned with list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Paging {
    /// Offset of the current page.
    #[serde(default)]
    pub offset: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Total number of items.
    #[serde(default)]
    pub count: u32,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
    /// Absolute URLs of following pages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
}

/// List response (`{"items": [...], "paging": {...}}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    /// Page items; absent when the collection is empty.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Paging information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T> ListResponse<T> {
    /// URL of the next page, if any.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|paging| paging.next.first())
            .map(String::as_str)
    }
}
