//! FMC policy resources.
//!
//! Access control policies and their rules, prefilter and intrusion
//! policies, FTD NAT policies with auto and manual rules, and FTD
//! site-to-site VPN topologies with their endpoints.
//!
//! Rules and endpoints live inside a parent policy; their parent id and
//! insertion position are client-side scope, never serialized, and are
//! carried over onto the objects the FMC returns.

#![deny(missing_docs)]

pub mod access;
pub mod intrusion;
pub mod nat;
pub mod prefilter;
pub mod vpn;

pub use access::{
    AccessPolicy, AccessRule, ApplicationSet, DefaultAction, DefaultActionType, ObjectSet,
    RuleAction, RuleSection,
};
pub use intrusion::IntrusionPolicy;
pub use nat::{AutoNatRule, FtdNatPolicy, ManualNatRule, NatSection, NatType};
pub use prefilter::{PrefilterAction, PrefilterDefaultAction, PrefilterPolicy};
pub use vpn::{ExtranetInfo, FtdS2sVpn, PeerType, ProtectedNetworks, TopologyType, VpnEndpoint};

/// Convenient result alias that reuses the shared FMC error type.
pub type Result<T> = fmc_core::Result<T>;
