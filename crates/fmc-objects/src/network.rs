//! Address objects: hosts, networks, ranges, FQDNs and network groups.

use crate::Result;
use fmc_client::{fmc_resource, ObjectId, ServerVersion};
use fmc_core::types::{Literal, Metadata};
use fmc_core::validation::{
    is_ip, is_ip_network, is_ip_range, network_address_kind, object_name, sanitize_name,
};
use fmc_core::{Error, ObjectRef};
use serde::{Deserialize, Serialize};

fn checked(value: &str, valid: fn(&str) -> bool) -> Result<String> {
    let value = value.trim();
    if valid(value) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidAddress(value.to_string()))
    }
}

/// Single address (`object/hosts`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Host`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// IPv4 or IPv6 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
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

impl Host {
    /// Create a host with a sanitized name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] unless `value` is a single address,
    /// or [`Error::ValidationError`] for an empty or overlong name.
    pub fn new(name: &str, value: &str) -> Result<Self> {
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("Host".to_string()),
            value: Some(checked(value, is_ip)?),
            ..Self::default()
        })
    }
}

fmc_resource!(Host, "Host", "object/hosts", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "value"];
});

/// Address with prefix (`object/networks`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Network`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Network in CIDR notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
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

impl Network {
    /// Create a network with a sanitized name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] unless `value` is `address/prefix`.
    pub fn new(name: &str, value: &str) -> Result<Self> {
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("Network".to_string()),
            value: Some(checked(value, is_ip_network)?),
            ..Self::default()
        })
    }
}

fmc_resource!(Network, "Network", "object/networks", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "value"];
});

/// Address range (`object/ranges`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Range`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `first-last` address range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
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

impl Range {
    /// Create a range with a sanitized name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] unless `value` is an ordered
    /// same-family range.
    pub fn new(name: &str, value: &str) -> Result<Self> {
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("Range".to_string()),
            value: Some(checked(value, is_ip_range)?),
            ..Self::default()
        })
    }
}

fmc_resource!(Range, "Range", "object/ranges", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "value"];
});

/// Address families an FQDN object resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DnsResolution {
    /// A records only
    Ipv4Only,
    /// AAAA records only
    Ipv6Only,
    /// Both record types
    Ipv4AndIpv6,
}

/// DNS name resolved by managed devices (`object/fqdns`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fqdn {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `FQDN`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Fully qualified domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Families to resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_resolution: Option<DnsResolution>,
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

impl Fqdn {
    /// Create an FQDN object resolving both address families.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("FQDN".to_string()),
            value: Some(value.trim().to_string()),
            dns_resolution: Some(DnsResolution::Ipv4AndIpv6),
            ..Self::default()
        }
    }
}

fmc_resource!(Fqdn, "FQDN", "object/fqdns", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "value"];
    const FIRST_SUPPORTED_VERSION: ServerVersion = ServerVersion::new(6, 3, 0);
});

/// Group of address objects and literals (`object/networkgroups`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGroup {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `NetworkGroup`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Member objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectRef>,
    /// Inline addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<Literal>,
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

impl NetworkGroup {
    /// Create an empty group with a sanitized name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("NetworkGroup".to_string()),
            ..Self::default()
        }
    }

    /// Add an inline address, typed as host, network or range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for anything else.
    pub fn add_literal(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        let kind = network_address_kind(value)?;
        if !self
            .literals
            .iter()
            .any(|literal| literal.value.as_deref() == Some(value))
        {
            self.literals.push(Literal::value(kind.literal_type(), value));
        }
        Ok(())
    }

    /// Remove the literal with `value`; returns whether one was removed.
    pub fn remove_literal(&mut self, value: &str) -> bool {
        let before = self.literals.len();
        self.literals
            .retain(|literal| literal.value.as_deref() != Some(value));
        before != self.literals.len()
    }
}

crate::group_members!(NetworkGroup);

fmc_resource!(NetworkGroup, "NetworkGroup", "object/networkgroups");

#[cfg(test)]
mod tests {
    use super::*;
    use fmc_core::validation::MAX_NAME_LENGTH;
    use serde_json::json;

    #[test]
    fn host_constructor_sanitizes_and_validates() {
        let host = Host::new("web server", " 10.0.0.5 ").unwrap();
        assert_eq!(host.name.as_deref(), Some("web_server"));
        assert_eq!(host.value.as_deref(), Some("10.0.0.5"));
        assert!(matches!(
            Host::new("bad", "10.0.0.0/24"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn network_and_range_validation() {
        assert!(Network::new("lan", "192.168.0.0/16").is_ok());
        assert!(Network::new("lan", "192.168.0.0/33").is_err());
        assert!(Range::new("pool", "10.0.0.10-10.0.0.20").is_ok());
        assert!(Range::new("pool", "10.0.0.20-10.0.0.10").is_err());
    }

    #[test]
    fn constructors_reject_unusable_names() {
        let long = "h".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(Host::new(&long, "10.0.0.5"), Err(Error::ValidationError(_))));
        assert!(matches!(Network::new("", "10.0.0.0/8"), Err(Error::ValidationError(_))));
        assert!(Range::new(" ", "10.0.0.1-10.0.0.9").is_err());
    }

    #[test]
    fn host_serialization_skips_metadata_and_empty_fields() {
        let mut host = Host::new("web", "10.0.0.5").unwrap();
        host.metadata = Some(Metadata::default());
        assert_eq!(
            serde_json::to_value(&host).unwrap(),
            json!({"name": "web", "type": "Host", "value": "10.0.0.5"})
        );
    }

    #[test]
    fn fqdn_serializes_resolution() {
        let fqdn = Fqdn::new("updates", "updates.example.com");
        assert_eq!(
            serde_json::to_value(&fqdn).unwrap()["dnsResolution"],
            "IPV4_AND_IPV6"
        );
    }

    #[test]
    fn network_group_members() {
        let mut group = NetworkGroup::new("servers");
        group.add_literal("10.0.0.5").unwrap();
        group.add_literal("10.1.0.0/16").unwrap();
        group.add_literal("10.0.0.5").unwrap();
        assert!(group.add_literal("not-an-ip").is_err());
        assert_eq!(group.literals.len(), 2);
        assert_eq!(group.literals[1].kind, "Network");

        let id = ObjectId::parse_str("HOST-1").unwrap();
        group.add_object(ObjectRef::new(id.clone(), "Host"));
        group.add_object(ObjectRef::new(id.clone(), "Host"));
        assert_eq!(group.objects.len(), 1);
        assert!(group.remove_object(&id));
        assert!(!group.remove_object(&id));
        assert!(group.remove_literal("10.0.0.5"));
        assert_eq!(group.literals.len(), 1);
    }
}
