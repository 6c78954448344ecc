//! Application catalogue entries (read-only).

use fmc_client::{fmc_resource, ObjectId, Operations};
use fmc_core::types::Metadata;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};

/// Application known to the FMC detectors (`object/applications`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Application name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Application`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Numeric application id used by the detectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u64>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_categories: Vec<ObjectRef>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ObjectRef>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl Application {
    /// Template for a lookup by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reference usable in access rules.
    #[must_use]
    pub fn to_ref(&self) -> Option<ObjectRef> {
        let id = self.id.clone()?;
        let reference = ObjectRef::new(id, "Application");
        Some(match &self.name {
            Some(name) => reference.with_name(name.clone()),
            None => reference,
        })
    }
}

fmc_resource!(Application, "Application", "object/applications", {
    const OPERATIONS: Operations = Operations::READ_ONLY;
});
