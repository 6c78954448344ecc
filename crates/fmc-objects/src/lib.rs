//! FMC object resources.
//!
//! Typed models for the reusable objects under `object/...`: addresses and
//! address groups, ports, ICMP types, security zones and interface groups,
//! URLs, VLAN tags and the read-only application catalogue. Every type
//! implements [`fmc_client::Resource`], so it is created, fetched, listed,
//! updated and deleted through [`fmc_client::FmcClient`].

#![deny(missing_docs)]

pub mod application;
pub mod interface;
pub mod network;
pub mod port;
pub mod urls;
pub mod vlan;

pub use application::Application;
pub use interface::{InterfaceGroup, InterfaceMode, SecurityZone};
pub use network::{DnsResolution, Fqdn, Host, Network, NetworkGroup, Range};
pub use port::{IcmpV4Object, PortObjectGroup, ProtocolPortObject};
pub use urls::{UrlGroup, UrlLiteral, UrlObject};
pub use vlan::{VlanRange, VlanTag};

/// Convenient result alias that reuses the shared FMC error type.
pub type Result<T> = fmc_core::Result<T>;

/// Object membership editing shared by the group types.
macro_rules! group_members {
    ($ty:ty) => {
        impl $ty {
            /// Add a referenced object unless one with the same id is present.
            pub fn add_object(&mut self, object: fmc_core::ObjectRef) {
                if !self.objects.iter().any(|existing| existing.id == object.id) {
                    self.objects.push(object);
                }
            }

            /// Remove the referenced object with `id`; returns whether one was removed.
            pub fn remove_object(&mut self, id: &fmc_core::ObjectId) -> bool {
                let before = self.objects.len();
                self.objects.retain(|existing| &existing.id != id);
                before != self.objects.len()
            }
        }
    };
}

pub(crate) use group_members;
