//! FTD site-to-site VPN topologies and their endpoints.

use crate::Result;
use fmc_client::{fmc_resource, nested_path, ObjectId, Resource, ServerVersion};
use fmc_core::types::Metadata;
use fmc_core::validation::{is_ip, sanitize_name};
use fmc_core::{Error, ObjectRef};
use serde::{Deserialize, Serialize};

/// Shape of a VPN topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopologyType {
    /// Two peers
    PointToPoint,
    /// Hubs with spokes
    HubAndSpoke,
    /// Every peer to every peer
    FullMesh,
}

/// Site-to-site VPN topology (`policy/ftds2svpns`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FtdS2sVpn {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Topology name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `FTDS2SVpn`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Topology shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_type: Option<TopologyType>,
    /// Negotiate with IKEv1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ike_v1_enabled: Option<bool>,
    /// Negotiate with IKEv2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ike_v2_enabled: Option<bool>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// IKE settings created with the topology.
    #[serde(default, skip_serializing)]
    pub ike_settings: Vec<ObjectRef>,
    /// IPsec settings created with the topology.
    #[serde(default, skip_serializing)]
    pub ipsec_settings: Vec<ObjectRef>,
    /// Advanced settings created with the topology.
    #[serde(default, skip_serializing)]
    pub advanced_settings: Vec<ObjectRef>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl FtdS2sVpn {
    /// Create a topology negotiating IKEv2 only.
    #[must_use]
    pub fn new(name: &str, topology: TopologyType) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("FTDS2SVpn".to_string()),
            topology_type: Some(topology),
            ike_v1_enabled: Some(false),
            ike_v2_enabled: Some(true),
            ..Self::default()
        }
    }

    /// Template addressing this topology's endpoints.
    #[must_use]
    pub fn endpoints(&self) -> Option<VpnEndpoint> {
        self.id.clone().map(|id| VpnEndpoint {
            vpn_id: Some(id),
            ..VpnEndpoint::default()
        })
    }
}

fmc_resource!(FtdS2sVpn, "FTDS2SVpn", "policy/ftds2svpns", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "topologyType"];
    const FIRST_SUPPORTED_VERSION: ServerVersion = ServerVersion::new(6, 3, 0);
});

/// Role of an endpoint in its topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeerType {
    /// Point-to-point or full mesh member
    Peer,
    /// Hub in hub-and-spoke
    Hub,
    /// Spoke in hub-and-spoke
    Spoke,
}

/// Networks protected behind an endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProtectedNetworks {
    /// Network objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<ObjectRef>,
}

/// Peer outside FMC management.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtranetInfo {
    /// Peer display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Peer address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Peer address is assigned dynamically.
    #[serde(rename = "isDynamicIP", default, skip_serializing_if = "Option::is_none")]
    pub is_dynamic_ip: Option<bool>,
}

/// Endpoint of a VPN topology (`policy/ftds2svpns/{vpn}/endpoints`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VpnEndpoint {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Endpoint name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `EndPoint`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Role in the topology.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_type: Option<PeerType>,
    /// Managed device terminating the tunnel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<ObjectRef>,
    /// Device interface terminating the tunnel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<ObjectRef>,
    /// Networks reachable through the tunnel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_networks: Option<ProtectedNetworks>,
    /// Peer is not managed by this FMC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extranet: Option<bool>,
    /// Details of an unmanaged peer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extranet_info: Option<ExtranetInfo>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,

    /// Owning topology.
    #[serde(skip)]
    pub vpn_id: Option<ObjectId>,
}

impl VpnEndpoint {
    /// Endpoint on a managed device.
    #[must_use]
    pub fn managed(
        vpn_id: ObjectId,
        name: &str,
        peer_type: PeerType,
        device: ObjectRef,
        interface: ObjectRef,
    ) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("EndPoint".to_string()),
            peer_type: Some(peer_type),
            device: Some(device),
            interface: Some(interface),
            extranet: Some(false),
            vpn_id: Some(vpn_id),
            ..Self::default()
        }
    }

    /// Endpoint for an unmanaged peer at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] unless `address` is a single IP.
    pub fn extranet(
        vpn_id: ObjectId,
        name: &str,
        peer_type: PeerType,
        address: &str,
    ) -> Result<Self> {
        let address = address.trim();
        if !is_ip(address) {
            return Err(Error::InvalidAddress(address.to_string()));
        }
        let name = sanitize_name(name);
        Ok(Self {
            name: Some(name.clone()),
            kind: Some("EndPoint".to_string()),
            peer_type: Some(peer_type),
            extranet: Some(true),
            extranet_info: Some(ExtranetInfo {
                name: Some(name),
                ip_address: Some(address.to_string()),
                is_dynamic_ip: Some(false),
            }),
            vpn_id: Some(vpn_id),
            ..Self::default()
        })
    }

    /// Protect a network object behind this endpoint.
    pub fn add_protected_network(&mut self, network: ObjectRef) {
        let set = self
            .protected_networks
            .get_or_insert_with(ProtectedNetworks::default);
        if !set.networks.iter().any(|n| n.id == network.id) {
            set.networks.push(network);
        }
    }
}

impl Resource for VpnEndpoint {
    const KIND: &'static str = "EndPoint";
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "peerType"];
    const FIRST_SUPPORTED_VERSION: ServerVersion = ServerVersion::new(6, 3, 0);

    fn collection_path(&self) -> Result<String> {
        nested_path(Self::KIND, self.vpn_id.as_ref(), "policy/ftds2svpns", "endpoints")
    }

    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn inherit_scope(&mut self, template: &Self) {
        self.vpn_id.clone_from(&template.vpn_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vpn_id() -> ObjectId {
        ObjectId::parse_str("VPN-1").unwrap()
    }

    #[test]
    fn topology_wire_shape() {
        let vpn = FtdS2sVpn::new("branch tunnels", TopologyType::HubAndSpoke);
        assert_eq!(
            serde_json::to_value(&vpn).unwrap(),
            json!({
                "name": "branch_tunnels",
                "type": "FTDS2SVpn",
                "topologyType": "HUB_AND_SPOKE",
                "ikeV1Enabled": false,
                "ikeV2Enabled": true
            })
        );
    }

    #[test]
    fn topology_settings_are_read_back() {
        let vpn: FtdS2sVpn = serde_json::from_value(json!({
            "id": "VPN-1",
            "name": "t",
            "type": "FTDS2SVpn",
            "topologyType": "POINT_TO_POINT",
            "ikeSettings": [{"id": "IKE-1", "type": "IkeSetting"}]
        }))
        .unwrap();
        assert_eq!(vpn.ike_settings.len(), 1);
        assert_eq!(vpn.endpoints().and_then(|e| e.vpn_id), Some(vpn_id()));
        assert!(serde_json::to_value(&vpn).unwrap().get("ikeSettings").is_none());
    }

    #[test]
    fn extranet_endpoint() {
        let mut endpoint =
            VpnEndpoint::extranet(vpn_id(), "hq", PeerType::Peer, "198.51.100.7").unwrap();
        let network = ObjectId::parse_str("N-1").unwrap();
        endpoint.add_protected_network(ObjectRef::new(network, "Network"));
        assert_eq!(
            serde_json::to_value(&endpoint).unwrap(),
            json!({
                "name": "hq",
                "type": "EndPoint",
                "peerType": "PEER",
                "protectedNetworks": {"networks": [{"id": "N-1", "type": "Network"}]},
                "extranet": true,
                "extranetInfo": {"name": "hq", "ipAddress": "198.51.100.7", "isDynamicIP": false}
            })
        );
        assert_eq!(
            endpoint.collection_path().unwrap(),
            "policy/ftds2svpns/VPN-1/endpoints"
        );
        assert!(VpnEndpoint::extranet(vpn_id(), "hq", PeerType::Peer, "10.0.0.0/8").is_err());
    }
}
