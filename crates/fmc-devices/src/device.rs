//! Managed devices, their physical interfaces, and device groups.

use crate::Result;
use fmc_client::{fmc_resource, nested_path, ObjectId, Operations, Resource};
use fmc_core::types::Metadata;
use fmc_core::validation::{is_ip, object_name, sanitize_name};
use fmc_core::{Error, ObjectRef};
use serde::{Deserialize, Serialize};

/// Device registered with the FMC (`devices/devicerecords`).
///
/// Registration is asynchronous on the FMC side: a successful create
/// returns the pending registration, and the device appears in listings
/// once it has checked in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Device`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Management address or DNS name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    /// Registration key configured on the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_key: Option<String>,
    /// NAT id, for devices behind NAT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_id: Option<String>,
    /// Licenses (`BASE`, `MALWARE`, `URLFilter`, `THREAT`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub license_caps: Vec<String>,
    /// Access policy applied on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_policy: Option<ObjectRef>,
    /// Group to place the device in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_group: Option<ObjectRef>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hardware model, reported by the FMC.
    #[serde(default, skip_serializing)]
    pub model: Option<String>,
    /// Software version, reported by the FMC.
    #[serde(default, skip_serializing)]
    pub sw_version: Option<String>,
    /// Health status, reported by the FMC.
    #[serde(default, skip_serializing)]
    pub health_status: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl DeviceRecord {
    /// Registration request for a device reachable at `host_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if `host_name` or `reg_key` is
    /// empty or contains whitespace, or if `name` is unusable.
    pub fn new(
        name: &str,
        host_name: &str,
        reg_key: &str,
        access_policy: ObjectRef,
    ) -> Result<Self> {
        let host_name = host_name.trim();
        if host_name.is_empty() || host_name.contains(char::is_whitespace) {
            return Err(Error::ValidationError(format!(
                "invalid device host name `{host_name}`"
            )));
        }
        if reg_key.trim().is_empty() {
            return Err(Error::ValidationError(
                "device registration key is empty".to_string(),
            ));
        }
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("Device".to_string()),
            host_name: Some(host_name.to_string()),
            reg_key: Some(reg_key.to_string()),
            license_caps: vec!["BASE".to_string()],
            access_policy: Some(access_policy),
            ..Self::default()
        })
    }

    /// Add a license unless already requested.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        let license = license.into();
        if !self.license_caps.contains(&license) {
            self.license_caps.push(license);
        }
        self
    }

    /// Template addressing this device's physical interfaces.
    #[must_use]
    pub fn interfaces(&self) -> Option<PhysicalInterface> {
        self.id.clone().map(|id| PhysicalInterface {
            device_id: Some(id),
            ..PhysicalInterface::default()
        })
    }

    /// Reference usable in assignments, groups and VPN endpoints.
    #[must_use]
    pub fn to_ref(&self) -> Option<ObjectRef> {
        self.id.clone().map(|id| ObjectRef::new(id, "Device"))
    }
}

fmc_resource!(DeviceRecord, "Device", "devices/devicerecords", {
    const REQUIRED_FOR_POST: &'static [&'static str] =
        &["name", "hostName", "regKey", "type", "accessPolicy"];
});

/// Static IPv4 address of an interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaticIpv4 {
    /// Address.
    pub address: String,
    /// Prefix length or dotted mask.
    pub netmask: String,
}

/// IPv4 addressing of an interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ipv4Config {
    /// Static address.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_address: Option<StaticIpv4>,
    /// DHCP client settings, kept as sent by the FMC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<serde_json::Value>,
}

/// Physical interface of a device
/// (`devices/devicerecords/{device}/physicalinterfaces`).
///
/// Interfaces come with the hardware; they can be read and reconfigured
/// but not created or deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalInterface {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Hardware name (e.g. `GigabitEthernet0/1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `PhysicalInterface`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Logical name.
    #[serde(rename = "ifname", default, skip_serializing_if = "Option::is_none")]
    pub if_name: Option<String>,
    /// Administrative state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Interface mode (`NONE`, `INLINE`, `PASSIVE`, `TAP`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// MTU.
    #[serde(rename = "MTU", default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    /// Security zone membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_zone: Option<ObjectRef>,
    /// IPv4 addressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Config>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,

    /// Owning device.
    #[serde(skip)]
    pub device_id: Option<ObjectId>,
}

impl PhysicalInterface {
    /// Assign a static IPv4 address; `netmask` is a prefix length or a
    /// dotted mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for a bad address or mask.
    pub fn set_static_ipv4(&mut self, address: &str, netmask: &str) -> Result<()> {
        let address = address.trim();
        let netmask = netmask.trim();
        if !is_ip(address) {
            return Err(Error::InvalidAddress(address.to_string()));
        }
        let prefix_ok = netmask.parse::<u8>().is_ok_and(|bits| bits <= 32);
        if !prefix_ok && !is_ip(netmask) {
            return Err(Error::InvalidAddress(format!("{address}/{netmask}")));
        }
        self.ipv4 = Some(Ipv4Config {
            static_address: Some(StaticIpv4 {
                address: address.to_string(),
                netmask: netmask.to_string(),
            }),
            dhcp: None,
        });
        Ok(())
    }
}

impl Resource for PhysicalInterface {
    const KIND: &'static str = "PhysicalInterface";
    const OPERATIONS: Operations = Operations::GET_PUT;
    const REQUIRED_FOR_PUT: &'static [&'static str] = &["id", "name"];

    fn collection_path(&self) -> Result<String> {
        nested_path(
            Self::KIND,
            self.device_id.as_ref(),
            "devices/devicerecords",
            "physicalinterfaces",
        )
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn inherit_scope(&mut self, template: &Self) {
        self.device_id.clone_from(&template.device_id);
    }
}

/// Group of devices (`devicegroups/devicegrouprecords`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `DeviceGroup`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Devices in the group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ObjectRef>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl DeviceGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("DeviceGroup".to_string()),
            ..Self::default()
        }
    }

    /// Add a device unless already a member.
    pub fn add_member(&mut self, device: ObjectRef) {
        if !self.members.iter().any(|m| m.id == device.id) {
            self.members.push(device);
        }
    }

    /// Remove a device; returns whether it was a member.
    pub fn remove_member(&mut self, id: &ObjectId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.id != id);
        before != self.members.len()
    }
}

fmc_resource!(DeviceGroup, "DeviceGroup", "devicegroups/devicegrouprecords");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acp() -> ObjectRef {
        ObjectRef::new(ObjectId::parse_str("ACP-1").unwrap(), "AccessPolicy")
    }

    #[test]
    fn device_registration_payload() {
        let device = DeviceRecord::new("branch ftd", "192.0.2.10", "cisco123", acp())
            .unwrap()
            .with_license("THREAT")
            .with_license("BASE");
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({
                "name": "branch_ftd",
                "type": "Device",
                "hostName": "192.0.2.10",
                "regKey": "cisco123",
                "licenseCaps": ["BASE", "THREAT"],
                "accessPolicy": {"id": "ACP-1", "type": "AccessPolicy"}
            })
        );
        assert!(device.interfaces().is_none());
    }

    #[test]
    fn device_registration_rejects_bad_input() {
        assert!(DeviceRecord::new("d", "", "key", acp()).is_err());
        assert!(DeviceRecord::new("d", "ftd 1", "key", acp()).is_err());
        assert!(DeviceRecord::new("d", "ftd1.example.com", " ", acp()).is_err());
    }

    #[test]
    fn reported_fields_are_not_sent_back() {
        let device: DeviceRecord = serde_json::from_value(json!({
            "id": "DEV-1",
            "name": "ftd1",
            "type": "Device",
            "model": "Cisco Firepower Threat Defense for VMware",
            "swVersion": "7.2.5",
            "healthStatus": "green"
        }))
        .unwrap();
        assert_eq!(device.sw_version.as_deref(), Some("7.2.5"));
        let body = serde_json::to_value(&device).unwrap();
        assert!(body.get("model").is_none());
        assert!(body.get("healthStatus").is_none());
    }

    #[test]
    fn interface_static_address() {
        let mut interface = PhysicalInterface::default();
        interface.set_static_ipv4("10.0.0.1", "24").unwrap();
        interface.set_static_ipv4("10.0.0.1", "255.255.255.0").unwrap();
        assert!(interface.set_static_ipv4("10.0.0.1", "33").is_err());
        assert!(interface.set_static_ipv4("10.0.0.300", "24").is_err());
        assert_eq!(
            serde_json::to_value(&interface.ipv4).unwrap(),
            json!({"static": {"address": "10.0.0.1", "netmask": "255.255.255.0"}})
        );
    }

    #[test]
    fn interface_path_and_operations() {
        assert!(PhysicalInterface::default().collection_path().is_err());
        let device = DeviceRecord {
            id: Some(ObjectId::parse_str("DEV-1").unwrap()),
            ..DeviceRecord::default()
        };
        let template = device.interfaces().unwrap();
        assert_eq!(
            template.collection_path().unwrap(),
            "devices/devicerecords/DEV-1/physicalinterfaces"
        );
        assert!(!PhysicalInterface::OPERATIONS.supports(fmc_client::Operation::Post));
    }

    #[test]
    fn device_group_members() {
        let mut group = DeviceGroup::new("branches");
        let device = ObjectRef::new(ObjectId::parse_str("DEV-1").unwrap(), "Device");
        group.add_member(device.clone());
        group.add_member(device);
        assert_eq!(group.members.len(), 1);
        assert!(group.remove_member(&ObjectId::parse_str("DEV-1").unwrap()));
        assert!(!group.remove_member(&ObjectId::parse_str("DEV-1").unwrap()));
    }
}
