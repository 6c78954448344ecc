//! Security zones and interface groups.
//!
//! Both group device interfaces; the FMC refuses to mix interfaces whose
//! mode differs from the group's `interfaceMode`.

use fmc_client::{fmc_resource, ObjectId};
use fmc_core::types::Metadata;
use fmc_core::validation::sanitize_name;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};

/// Interface mode of a zone or interface group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceMode {
    /// Passive (IDS) interfaces
    Passive,
    /// Inline pairs
    Inline,
    /// Switched (layer 2)
    Switched,
    /// Routed (layer 3)
    Routed,
    /// ASA interfaces
    Asa,
}

/// Security zone (`object/securityzones`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityZone {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `SecurityZone`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Mode every member interface must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_mode: Option<InterfaceMode>,
    /// Member interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<ObjectRef>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl SecurityZone {
    /// Create an empty zone.
    #[must_use]
    pub fn new(name: &str, mode: InterfaceMode) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("SecurityZone".to_string()),
            interface_mode: Some(mode),
            ..Self::default()
        }
    }

    /// Add an interface unless it is already a member.
    pub fn add_interface(&mut self, interface: ObjectRef) {
        if !self.interfaces.iter().any(|i| i.id == interface.id) {
            self.interfaces.push(interface);
        }
    }
}

fmc_resource!(SecurityZone, "SecurityZone", "object/securityzones", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "interfaceMode"];
});

/// Interface group (`object/interfacegroups`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceGroup {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `InterfaceGroup`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Mode every member interface must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_mode: Option<InterfaceMode>,
    /// Member interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<ObjectRef>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl InterfaceGroup {
    /// Create an empty interface group.
    #[must_use]
    pub fn new(name: &str, mode: InterfaceMode) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("InterfaceGroup".to_string()),
            interface_mode: Some(mode),
            ..Self::default()
        }
    }
}

fmc_resource!(InterfaceGroup, "InterfaceGroup", "object/interfacegroups", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "interfaceMode"];
});
