//! FTD NAT policies with their auto (object) and manual (twice) NAT rules.

use crate::Result;
use fmc_client::{fmc_resource, nested_path, ObjectId, Resource};
use fmc_core::query::QueryParams;
use fmc_core::types::Metadata;
use fmc_core::validation::sanitize_name;
use fmc_core::ObjectRef;
use serde::{Deserialize, Serialize};
use std::fmt;

const NAT_POLICIES: &str = "policy/ftdnatpolicies";

/// FTD NAT policy (`policy/ftdnatpolicies`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FtdNatPolicy {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Policy name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `FTDNatPolicy`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl FtdNatPolicy {
    /// Create an empty NAT policy.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("FTDNatPolicy".to_string()),
            ..Self::default()
        }
    }

    /// Template addressing this policy's auto NAT rules.
    #[must_use]
    pub fn auto_rules(&self) -> Option<AutoNatRule> {
        self.id.clone().map(|id| AutoNatRule {
            nat_policy_id: Some(id),
            ..AutoNatRule::default()
        })
    }

    /// Template addressing this policy's manual NAT rules.
    #[must_use]
    pub fn manual_rules(&self) -> Option<ManualNatRule> {
        self.id.clone().map(|id| ManualNatRule {
            nat_policy_id: Some(id),
            ..ManualNatRule::default()
        })
    }
}

fmc_resource!(FtdNatPolicy, "FTDNatPolicy", "policy/ftdnatpolicies");

/// Translation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NatType {
    /// One-to-one, bidirectional
    Static,
    /// Many-to-one or many-to-many, outbound only
    Dynamic,
}

/// Position of a manual rule relative to the auto rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatSection {
    /// Evaluated before auto NAT rules
    BeforeAuto,
    /// Evaluated after auto NAT rules
    AfterAuto,
}

impl NatSection {
    /// Query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeAuto => "before_auto",
            Self::AfterAuto => "after_auto",
        }
    }
}

impl fmt::Display for NatSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object NAT rule (`policy/ftdnatpolicies/{policy}/autonatrules`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoNatRule {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Always `FTDAutoNatRule`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Translation type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<NatType>,
    /// Real address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_network: Option<ObjectRef>,
    /// Mapped address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_network: Option<ObjectRef>,
    /// Translate to the destination interface address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_in_translated_network: Option<bool>,
    /// Real interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_interface: Option<ObjectRef>,
    /// Mapped interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_interface: Option<ObjectRef>,
    /// Port translation protocol (`TCP` or `UDP`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_protocol: Option<String>,
    /// Real port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_port: Option<u16>,
    /// Mapped port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_port: Option<u16>,
    /// Rewrite DNS replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<bool>,
    /// Do not answer ARP for the mapped address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_proxy_arp: Option<bool>,
    /// Look up the route instead of using the destination interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_lookup: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,

    /// Owning NAT policy.
    #[serde(skip)]
    pub nat_policy_id: Option<ObjectId>,
}

impl AutoNatRule {
    /// Create a rule translating `original` inside `nat_policy_id`.
    #[must_use]
    pub fn new(nat_policy_id: ObjectId, nat_type: NatType, original: ObjectRef) -> Self {
        Self {
            kind: Some("FTDAutoNatRule".to_string()),
            nat_type: Some(nat_type),
            original_network: Some(original),
            nat_policy_id: Some(nat_policy_id),
            ..Self::default()
        }
    }

    /// Translate to `translated`.
    #[must_use]
    pub fn translate_to(mut self, translated: ObjectRef) -> Self {
        self.translated_network = Some(translated);
        self.interface_in_translated_network = None;
        self
    }

    /// Translate to the destination interface address (PAT).
    #[must_use]
    pub fn translate_to_interface(mut self) -> Self {
        self.translated_network = None;
        self.interface_in_translated_network = Some(true);
        self
    }

    /// Restrict to a pair of interface objects.
    #[must_use]
    pub fn between(mut self, source: ObjectRef, destination: ObjectRef) -> Self {
        self.source_interface = Some(source);
        self.destination_interface = Some(destination);
        self
    }
}

impl Resource for AutoNatRule {
    const KIND: &'static str = "FTDAutoNatRule";
    const REQUIRED_FOR_POST: &'static [&'static str] = &["natType", "originalNetwork"];

    fn collection_path(&self) -> Result<String> {
        nested_path(
            Self::KIND,
            self.nat_policy_id.as_ref(),
            NAT_POLICIES,
            "autonatrules",
        )
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn inherit_scope(&mut self, template: &Self) {
        self.nat_policy_id.clone_from(&template.nat_policy_id);
    }
}

/// Twice NAT rule (`policy/ftdnatpolicies/{policy}/manualnatrules`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualNatRule {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Always `FTDManualNatRule`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Translation type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<NatType>,
    /// Whether the rule is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Real source address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_source: Option<ObjectRef>,
    /// Mapped source address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_source: Option<ObjectRef>,
    /// Real destination address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_destination: Option<ObjectRef>,
    /// Mapped destination address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_destination: Option<ObjectRef>,
    /// Real source port object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_source_port: Option<ObjectRef>,
    /// Mapped source port object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_source_port: Option<ObjectRef>,
    /// Real destination port object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_destination_port: Option<ObjectRef>,
    /// Mapped destination port object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_destination_port: Option<ObjectRef>,
    /// Translate the source to the destination interface address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_in_translated_source: Option<bool>,
    /// Real interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_interface: Option<ObjectRef>,
    /// Mapped interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_interface: Option<ObjectRef>,
    /// Only translate connections initiated from the source side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidirectional: Option<bool>,
    /// Do not answer ARP for the mapped address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_proxy_arp: Option<bool>,
    /// Look up the route instead of using the destination interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_lookup: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,

    /// Owning NAT policy.
    #[serde(skip)]
    pub nat_policy_id: Option<ObjectId>,
    /// Section to insert into.
    #[serde(skip)]
    pub section: Option<NatSection>,
    /// 1-based position within the section.
    #[serde(skip)]
    pub target_index: Option<u32>,
}

impl ManualNatRule {
    /// Create an enabled rule translating `original_source` inside `nat_policy_id`.
    #[must_use]
    pub fn new(nat_policy_id: ObjectId, nat_type: NatType, original_source: ObjectRef) -> Self {
        Self {
            kind: Some("FTDManualNatRule".to_string()),
            nat_type: Some(nat_type),
            enabled: Some(true),
            original_source: Some(original_source),
            nat_policy_id: Some(nat_policy_id),
            ..Self::default()
        }
    }

    /// Insert into a section.
    #[must_use]
    pub fn in_section(mut self, section: NatSection) -> Self {
        self.section = Some(section);
        self
    }

    /// Insert at a position within the section.
    #[must_use]
    pub fn at_index(mut self, index: u32) -> Self {
        self.target_index = Some(index);
        self
    }
}

impl Resource for ManualNatRule {
    const KIND: &'static str = "FTDManualNatRule";
    const REQUIRED_FOR_POST: &'static [&'static str] = &["natType", "originalSource"];

    fn collection_path(&self) -> Result<String> {
        nested_path(
            Self::KIND,
            self.nat_policy_id.as_ref(),
            NAT_POLICIES,
            "manualnatrules",
        )
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn post_params(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("section", self.section);
        params.push_opt("targetIndex", self.target_index);
        params.into_pairs()
    }

    fn inherit_scope(&mut self, template: &Self) {
        self.nat_policy_id.clone_from(&template.nat_policy_id);
        self.section = template.section;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(id: &str) -> ObjectRef {
        ObjectRef::new(ObjectId::parse_str(id).unwrap(), "Host")
    }

    #[test]
    fn auto_rule_interface_pat() {
        let policy = ObjectId::parse_str("NAT-1").unwrap();
        let rule = AutoNatRule::new(policy, NatType::Dynamic, host("H-1"))
            .translate_to(host("H-2"))
            .translate_to_interface();
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "type": "FTDAutoNatRule",
                "natType": "DYNAMIC",
                "originalNetwork": {"id": "H-1", "type": "Host"},
                "interfaceInTranslatedNetwork": true
            })
        );
        assert_eq!(
            rule.collection_path().unwrap(),
            "policy/ftdnatpolicies/NAT-1/autonatrules"
        );
    }

    #[test]
    fn manual_rule_position_goes_to_query() {
        let policy = ObjectId::parse_str("NAT-1").unwrap();
        let rule = ManualNatRule::new(policy, NatType::Static, host("H-1"))
            .in_section(NatSection::AfterAuto)
            .at_index(2);
        assert_eq!(
            rule.post_params(),
            vec![
                ("section", "after_auto".to_string()),
                ("targetIndex", "2".to_string()),
            ]
        );
        let body = serde_json::to_value(&rule).unwrap();
        assert!(body.get("section").is_none());
        assert!(body.get("targetIndex").is_none());
    }

    #[test]
    fn nat_rule_templates_need_a_saved_policy() {
        let mut policy = FtdNatPolicy::new("edge nat");
        assert!(policy.auto_rules().is_none());
        policy.id = Some(ObjectId::parse_str("NAT-9").unwrap());
        let template = policy.manual_rules().unwrap();
        assert_eq!(
            template.collection_path().unwrap(),
            "policy/ftdnatpolicies/NAT-9/manualnatrules"
        );
        assert!(ManualNatRule::default().collection_path().is_err());
    }
}
