//! Prefilter policies.

use fmc_client::{fmc_resource, ObjectId};
use fmc_core::types::Metadata;
use fmc_core::validation::sanitize_name;
use serde::{Deserialize, Serialize};

/// Default action for tunnel traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrefilterAction {
    /// Hand tunnels to the access policy
    AnalyzeTunnels,
    /// Drop tunnels
    BlockTunnels,
}

/// Default action block of a prefilter policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrefilterDefaultAction {
    /// Id of the default action; required when updating it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PrefilterAction>,
    /// Log at connection start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_begin: Option<bool>,
    /// Send connection events to the FMC.
    #[serde(
        rename = "sendEventsToFMC",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub send_events_to_fmc: Option<bool>,
}

/// Prefilter policy (`policy/prefilterpolicies`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrefilterPolicy {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `PrefilterPolicy`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Action for tunnels no rule matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<PrefilterDefaultAction>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl PrefilterPolicy {
    /// Create a policy with the given tunnel action.
    #[must_use]
    pub fn new(name: &str, action: PrefilterAction) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("PrefilterPolicy".to_string()),
            default_action: Some(PrefilterDefaultAction {
                action: Some(action),
                ..PrefilterDefaultAction::default()
            }),
            ..Self::default()
        }
    }
}

fmc_resource!(PrefilterPolicy, "PrefilterPolicy", "policy/prefilterpolicies");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefilter_default_action() {
        let policy = PrefilterPolicy::new("tunnels", PrefilterAction::BlockTunnels);
        assert_eq!(
            serde_json::to_value(&policy).unwrap(),
            json!({
                "name": "tunnels",
                "type": "PrefilterPolicy",
                "defaultAction": {"action": "BLOCK_TUNNELS"}
            })
        );
    }
}
