//! VLAN tag objects.

use crate::Result;
use fmc_client::{fmc_resource, ObjectId};
use fmc_core::types::Metadata;
use fmc_core::validation::{object_name, validate_vlan_range};
use serde::{Deserialize, Serialize};

/// Tag range carried in a VLAN object's `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VlanRange {
    /// First tag.
    pub start_tag: u16,
    /// Last tag.
    pub end_tag: u16,
    /// Always `VlanTagLiteral`.
    #[serde(rename = "type", default = "vlan_literal_type")]
    pub kind: String,
}

fn vlan_literal_type() -> String {
    "VlanTagLiteral".to_string()
}

/// VLAN tag or tag range (`object/vlantags`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VlanTag {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `VlanTag`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Tag range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<VlanRange>,
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

impl VlanTag {
    /// Create a VLAN object covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `1 <= start <= end <= 4094`.
    pub fn new(name: &str, start: u16, end: u16) -> Result<Self> {
        validate_vlan_range(start, end)?;
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("VlanTag".to_string()),
            data: Some(VlanRange {
                start_tag: start,
                end_tag: end,
                kind: vlan_literal_type(),
            }),
            ..Self::default()
        })
    }
}

fmc_resource!(VlanTag, "VlanTag", "object/vlantags", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "data.startTag", "data.endTag"];
});
