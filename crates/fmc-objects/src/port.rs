//! Port, port group and ICMP objects.

use crate::Result;
use fmc_client::{fmc_resource, ObjectId};
use fmc_core::types::{Literal, Metadata};
use fmc_core::validation::{is_port_or_range, object_name, sanitize_name};
use fmc_core::{Error, ObjectRef};
use serde::{Deserialize, Serialize};

/// Transport protocol and port (`object/protocolportobjects`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolPortObject {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `ProtocolPortObject`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `TCP` or `UDP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Port or `low-high` range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether child domains may override the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridable: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl ProtocolPortObject {
    /// Create a port object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for ports outside 1..=65535, a
    /// reversed range or an unusable name.
    pub fn new(name: &str, protocol: &str, port: &str) -> Result<Self> {
        let port = port.trim();
        if !is_port_or_range(port) {
            return Err(Error::ValidationError(format!("invalid port `{port}`")));
        }
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("ProtocolPortObject".to_string()),
            protocol: Some(protocol.trim().to_ascii_uppercase()),
            port: Some(port.to_string()),
            ..Self::default()
        })
    }
}

fmc_resource!(ProtocolPortObject, "ProtocolPortObject", "object/protocolportobjects", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "protocol"];
});

/// Group of port objects and literals (`object/portobjectgroups`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortObjectGroup {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `PortObjectGroup`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Member objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectRef>,
    /// Inline `PortLiteral`s.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<Literal>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl PortObjectGroup {
    /// Create an empty group with a sanitized name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("PortObjectGroup".to_string()),
            ..Self::default()
        }
    }

    /// Add an inline port literal. `protocol` is the IANA number (`6` for TCP).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an invalid port.
    pub fn add_port(&mut self, protocol: &str, port: &str) -> Result<()> {
        let port = port.trim();
        if !is_port_or_range(port) {
            return Err(Error::ValidationError(format!("invalid port `{port}`")));
        }
        let literal = Literal::port(protocol.trim(), port);
        if !self.literals.contains(&literal) {
            self.literals.push(literal);
        }
        Ok(())
    }

    /// Remove a port literal; returns whether one was removed.
    pub fn remove_port(&mut self, protocol: &str, port: &str) -> bool {
        let before = self.literals.len();
        self.literals.retain(|literal| {
            literal.protocol.as_deref() != Some(protocol) || literal.port.as_deref() != Some(port)
        });
        before != self.literals.len()
    }
}

crate::group_members!(PortObjectGroup);

fmc_resource!(PortObjectGroup, "PortObjectGroup", "object/portobjectgroups");

/// ICMPv4 type and code (`object/icmpv4objects`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IcmpV4Object {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `ICMPV4Object`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// ICMP type, 0..=255 as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<String>,
    /// ICMP code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u8>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether child domains may override the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridable: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl IcmpV4Object {
    /// Create an ICMP object matching `icmp_type` and, optionally, a code.
    #[must_use]
    pub fn new(name: &str, icmp_type: u8, code: Option<u8>) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("ICMPV4Object".to_string()),
            icmp_type: Some(icmp_type.to_string()),
            code,
            ..Self::default()
        }
    }
}

fmc_resource!(IcmpV4Object, "ICMPV4Object", "object/icmpv4objects", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "icmpType"];
});
