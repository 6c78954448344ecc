//! Intrusion policies (read-only).

use fmc_client::{fmc_resource, ObjectId, Operations};
use fmc_core::types::Metadata;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};

/// Intrusion policy (`policy/intrusionpolicies`).
///
/// Referenced from access rules and default actions via [`Self::to_ref`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntrusionPolicy {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `IntrusionPolicy`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Policy this one is derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_policy: Option<ObjectRef>,
    /// `PREVENTION` or `DETECTION`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_mode: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl IntrusionPolicy {
    /// Template for a lookup by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reference usable as an `ipsPolicy` or `intrusionPolicy`.
    #[must_use]
    pub fn to_ref(&self) -> Option<ObjectRef> {
        let id = self.id.clone()?;
        let reference = ObjectRef::new(id, "IntrusionPolicy");
        Some(match &self.name {
            Some(name) => reference.with_name(name.clone()),
            None => reference,
        })
    }
}

fmc_resource!(IntrusionPolicy, "IntrusionPolicy", "policy/intrusionpolicies", {
    const OPERATIONS: Operations = Operations::READ_ONLY;
});
