//! Policy-to-device assignments.

use fmc_client::{fmc_resource, ObjectId, Operations};
use fmc_core::types::Metadata;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};

/// Assignment of a policy to devices (`assignment/policyassignments`).
///
/// The FMC keys an assignment by the policy's id. Assignments cannot be
/// deleted; update one with an empty target list instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAssignment {
    /// Object id (the assigned policy's id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `PolicyAssignment`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Assigned policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ObjectRef>,
    /// Devices or device groups the policy applies to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<ObjectRef>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl PolicyAssignment {
    /// Assignment of `policy` with no targets yet.
    #[must_use]
    pub fn new(policy: ObjectRef) -> Self {
        Self {
            kind: Some("PolicyAssignment".to_string()),
            policy: Some(policy),
            ..Self::default()
        }
    }

    /// Apply the policy to a device or device group.
    pub fn add_target(&mut self, target: ObjectRef) {
        if !self.targets.iter().any(|t| t.id == target.id) {
            self.targets.push(target);
        }
    }

    /// Stop applying the policy to a target; returns whether it was assigned.
    pub fn remove_target(&mut self, id: &ObjectId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| &t.id != id);
        before != self.targets.len()
    }
}

fmc_resource!(PolicyAssignment, "PolicyAssignment", "assignment/policyassignments", {
    const OPERATIONS: Operations = Operations::NO_DELETE;
    const REQUIRED_FOR_POST: &'static [&'static str] = &["policy", "targets"];
});
