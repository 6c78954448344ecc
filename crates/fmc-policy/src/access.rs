//! Access control policies and access rules.

use crate::Result;
use fmc_client::{fmc_resource, nested_path, ObjectId, Resource};
use fmc_core::query::QueryParams;
use fmc_core::types::{Literal, Metadata};
use fmc_core::validation::{network_address_kind, sanitize_name};
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action taken for traffic no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefaultActionType {
    /// Drop
    Block,
    /// Pass without inspection
    Trust,
    /// Allow with intrusion inspection
    Permit,
    /// Discovery only
    NetworkDiscovery,
    /// Use the parent policy's action
    InheritFromParent,
}

/// Default action of an access policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DefaultAction {
    /// Id of the default action; required when updating it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DefaultActionType>,
    /// Intrusion policy applied with `PERMIT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrusion_policy: Option<ObjectRef>,
    /// Variable set for the intrusion policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_set: Option<ObjectRef>,
    /// Log at connection start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_begin: Option<bool>,
    /// Log at connection end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_end: Option<bool>,
    /// Send connection events to the FMC.
    #[serde(
        rename = "sendEventsToFMC",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub send_events_to_fmc: Option<bool>,
}

/// Access control policy (`policy/accesspolicies`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `AccessPolicy`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Action for unmatched traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<DefaultAction>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl AccessPolicy {
    /// Create a policy with the given default action.
    #[must_use]
    pub fn new(name: &str, action: DefaultActionType) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("AccessPolicy".to_string()),
            default_action: Some(DefaultAction {
                action: Some(action),
                ..DefaultAction::default()
            }),
            ..Self::default()
        }
    }

    /// Template addressing the rules of this policy.
    ///
    /// Returns `None` until the policy has an id.
    #[must_use]
    pub fn rules(&self) -> Option<AccessRule> {
        self.id.clone().map(|id| AccessRule {
            policy_id: Some(id),
            ..AccessRule::default()
        })
    }
}

fmc_resource!(AccessPolicy, "AccessPolicy", "policy/accesspolicies", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "defaultAction.action"];
});

/// Action of an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// Allow with inspection
    Allow,
    /// Allow without inspection
    Trust,
    /// Drop
    Block,
    /// Log and continue matching
    Monitor,
    /// Drop and reset
    BlockReset,
    /// Interactive block page
    BlockInteractive,
    /// Interactive block page, then reset
    BlockResetInteractive,
}

/// Rule section of an access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSection {
    /// Evaluated before child policies
    Mandatory,
    /// Evaluated after child policies
    Default,
}

impl RuleSection {
    /// Query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for RuleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Objects and literals matched by one rule condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectSet {
    /// Referenced objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectRef>,
    /// Inline values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<Literal>,
}

impl ObjectSet {
    /// Add an object unless one with the same id is present.
    pub fn add_object(&mut self, object: ObjectRef) {
        if !self.objects.iter().any(|o| o.id == object.id) {
            self.objects.push(object);
        }
    }

    /// Add an inline address typed as host, network or range.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an address.
    pub fn add_address(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        let kind = network_address_kind(value)?;
        let literal = Literal::value(kind.literal_type(), value);
        if !self.literals.contains(&literal) {
            self.literals.push(literal);
        }
        Ok(())
    }

    /// True when nothing is matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.literals.is_empty()
    }
}

/// Applications matched by an access rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplicationSet {
    /// Referenced applications.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ObjectRef>,
}

/// Rule inside an access policy
/// (`policy/accesspolicies/{policy}/accessrules`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessRule {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Rule name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `AccessRule`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Rule action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    /// Whether the rule is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Ingress zones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_zones: Option<ObjectSet>,
    /// Egress zones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_zones: Option<ObjectSet>,
    /// Source addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_networks: Option<ObjectSet>,
    /// Destination addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_networks: Option<ObjectSet>,
    /// Source ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ports: Option<ObjectSet>,
    /// Destination ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_ports: Option<ObjectSet>,
    /// Applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<ApplicationSet>,
    /// Intrusion policy for allowed traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ips_policy: Option<ObjectRef>,
    /// Variable set for the intrusion policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_set: Option<ObjectRef>,
    /// Log at connection start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_begin: Option<bool>,
    /// Log at connection end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_end: Option<bool>,
    /// Send connection events to the FMC.
    #[serde(
        rename = "sendEventsToFMC",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub send_events_to_fmc: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,

    /// Owning access policy.
    #[serde(skip)]
    pub policy_id: Option<ObjectId>,
    /// Section to insert into.
    #[serde(skip)]
    pub section: Option<RuleSection>,
    /// Category to insert into.
    #[serde(skip)]
    pub category: Option<String>,
    /// Insert above this rule index.
    #[serde(skip)]
    pub insert_before: Option<u32>,
    /// Insert below this rule index; ignored when `insert_before` is set.
    #[serde(skip)]
    pub insert_after: Option<u32>,
}

impl AccessRule {
    /// Create an enabled rule inside `policy_id`.
    #[must_use]
    pub fn new(policy_id: ObjectId, name: &str, action: RuleAction) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("AccessRule".to_string()),
            action: Some(action),
            enabled: Some(true),
            policy_id: Some(policy_id),
            ..Self::default()
        }
    }

    /// Insert into a section.
    #[must_use]
    pub fn in_section(mut self, section: RuleSection) -> Self {
        self.section = Some(section);
        self
    }

    /// Insert into a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Insert above the rule at `index` (1-based).
    #[must_use]
    pub fn insert_before(mut self, index: u32) -> Self {
        self.insert_before = Some(index);
        self.insert_after = None;
        self
    }

    /// Insert below the rule at `index` (1-based).
    #[must_use]
    pub fn insert_after(mut self, index: u32) -> Self {
        self.insert_after = Some(index);
        self.insert_before = None;
        self
    }

    /// Match traffic entering through `zone`.
    pub fn add_source_zone(&mut self, zone: ObjectRef) {
        self.source_zones.get_or_insert_with(ObjectSet::default).add_object(zone);
    }

    /// Match traffic leaving through `zone`.
    pub fn add_destination_zone(&mut self, zone: ObjectRef) {
        self.destination_zones
            .get_or_insert_with(ObjectSet::default)
            .add_object(zone);
    }

    /// Match a source network object.
    pub fn add_source_network(&mut self, network: ObjectRef) {
        self.source_networks
            .get_or_insert_with(ObjectSet::default)
            .add_object(network);
    }

    /// Match a destination network object.
    pub fn add_destination_network(&mut self, network: ObjectRef) {
        self.destination_networks
            .get_or_insert_with(ObjectSet::default)
            .add_object(network);
    }

    /// Match an inline source address.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an address.
    pub fn add_source_address(&mut self, value: &str) -> Result<()> {
        self.source_networks
            .get_or_insert_with(ObjectSet::default)
            .add_address(value)
    }

    /// Match an inline destination address.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an address.
    pub fn add_destination_address(&mut self, value: &str) -> Result<()> {
        self.destination_networks
            .get_or_insert_with(ObjectSet::default)
            .add_address(value)
    }

    /// Match a source port object.
    pub fn add_source_port(&mut self, port: ObjectRef) {
        self.source_ports.get_or_insert_with(ObjectSet::default).add_object(port);
    }

    /// Match a destination port object.
    pub fn add_destination_port(&mut self, port: ObjectRef) {
        self.destination_ports
            .get_or_insert_with(ObjectSet::default)
            .add_object(port);
    }

    /// Match an application.
    pub fn add_application(&mut self, application: ObjectRef) {
        let set = self.applications.get_or_insert_with(ApplicationSet::default);
        if !set.applications.iter().any(|a| a.id == application.id) {
            set.applications.push(application);
        }
    }
}

impl Resource for AccessRule {
    const KIND: &'static str = "AccessRule";
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "action"];

    fn collection_path(&self) -> Result<String> {
        nested_path(
            Self::KIND,
            self.policy_id.as_ref(),
            "policy/accesspolicies",
            "accessrules",
        )
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn post_params(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("section", self.section);
        params.push_opt("category", self.category.as_ref());
        match (self.insert_before, self.insert_after) {
            (Some(before), _) => params.push("insertBefore", before),
            (None, after) => params.push_opt("insertAfter", after),
        }
        params.into_pairs()
    }

    fn inherit_scope(&mut self, template: &Self) {
        self.policy_id.clone_from(&template.policy_id);
        self.section = template.section;
        self.category.clone_from(&template.category);
    }
}
