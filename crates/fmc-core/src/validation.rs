//! Local validation for values sent to the FMC.
//!
//! The FMC rejects object names with characters outside `[A-Za-z0-9._-]` and
//! malformed addresses; these helpers catch both before a request is made.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::error::{Error, Result};

/// Maximum length of an FMC object name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Highest valid VLAN tag.
pub const MAX_VLAN_TAG: u16 = 4094;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace characters the FMC does not accept in names with `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if is_valid_name_char(c) { c } else { '_' })
        .collect()
}

/// Check a name without altering it.
///
/// # Errors
///
/// Returns an error for empty, overlong, or invalid names.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::ValidationError("name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::ValidationError(format!(
            "name `{name}` exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    if let Some(bad) = name.chars().find(|c| !is_valid_name_char(*c)) {
        return Err(Error::ValidationError(format!(
            "name `{name}` contains invalid character `{bad}`"
        )));
    }
    Ok(())
}

/// Sanitize `name` and check the result is acceptable to the FMC.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] if the sanitized name is empty or
/// longer than [`MAX_NAME_LENGTH`].
pub fn object_name(name: &str) -> Result<String> {
    let name = sanitize_name(name);
    validate_name(&name)?;
    Ok(name)
}

/// Kind of address a value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Single address (`10.0.0.1`)
    Host,
    /// Address with prefix (`10.0.0.0/24`)
    Network,
    /// Address range (`10.0.0.1-10.0.0.9`)
    Range,
}

impl AddressKind {
    /// FMC literal type name.
    #[must_use]
    pub const fn literal_type(&self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::Network => "Network",
            Self::Range => "Range",
        }
    }
}

/// Returns true for a single IPv4 or IPv6 address.
#[must_use]
pub fn is_ip(value: &str) -> bool {
    value.trim().parse::<IpAddr>().is_ok()
}

/// Returns true for an address with a prefix length valid for its family.
#[must_use]
pub fn is_ip_network(value: &str) -> bool {
    let Some((addr, prefix)) = value.trim().split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr {
        IpAddr::V4(_) => prefix <= 32,
        IpAddr::V6(_) => prefix <= 128,
    }
}

/// Returns true for `start-end` where both ends share a family and `start <= end`.
#[must_use]
pub fn is_ip_range(value: &str) -> bool {
    let Some((start, end)) = value.trim().split_once('-') else {
        return false;
    };
    match (start.trim().parse::<IpAddr>(), end.trim().parse::<IpAddr>()) {
        (Ok(IpAddr::V4(a)), Ok(IpAddr::V4(b))) => a <= b,
        (Ok(IpAddr::V6(a)), Ok(IpAddr::V6(b))) => a <= b,
        _ => false,
    }
}

/// Classify an address value.
///
/// # Errors
///
/// Returns an error if the value is not a host, network, or range.
pub fn network_address_kind(value: &str) -> Result<AddressKind> {
    if is_ip(value) {
        Ok(AddressKind::Host)
    } else if is_ip_network(value) {
        Ok(AddressKind::Network)
    } else if is_ip_range(value) {
        Ok(AddressKind::Range)
    } else {
        Err(Error::InvalidAddress(value.to_string()))
    }
}

/// Returns true for `port` or `low-high` with ports in 1..=65535.
#[must_use]
pub fn is_port_or_range(value: &str) -> bool {
    let parse = |p: &str| p.trim().parse::<u16>().ok().filter(|p| *p > 0);
    match value.split_once('-') {
        Some((low, high)) => matches!((parse(low), parse(high)), (Some(l), Some(h)) if l <= h),
        None => parse(value).is_some(),
    }
}

/// Check a VLAN tag range.
///
/// # Errors
///
/// Returns an error unless `1 <= start <= end <= 4094`.
pub fn validate_vlan_range(start: u16, end: u16) -> Result<()> {
    if start == 0 || end > MAX_VLAN_TAG || start > end {
        return Err(Error::ValidationError(format!(
            "invalid VLAN range {start}-{end}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("web server #1"), "web_server__1");
        assert_eq!(sanitize_name("  lab.net-10_a  "), "lab.net-10_a");
        assert_eq!(sanitize_name("10.0.0.0/24"), "10.0.0.0_24");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("inside_zone").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("bad name").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_object_name() {
        assert_eq!(object_name(" web server ").unwrap(), "web_server");
        assert!(object_name("   ").is_err());
        assert!(object_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());
        let err = object_name(&"a".repeat(MAX_NAME_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, Error::ValidationError(msg) if msg.contains("exceeds")));
    }

    #[test]
    fn test_is_ip() {
        assert!(is_ip("10.1.2.3"));
        assert!(is_ip("2001:db8::1"));
        assert!(!is_ip("10.1.2"));
        assert!(!is_ip("10.0.0.0/8"));
    }

    #[test]
    fn test_is_ip_network() {
        assert!(is_ip_network("10.0.0.0/8"));
        assert!(is_ip_network("2001:db8::/32"));
        assert!(!is_ip_network("10.0.0.0/33"));
        assert!(!is_ip_network("10.0.0.0"));
        assert!(!is_ip_network("host/24"));
    }

    #[test]
    fn test_is_ip_range() {
        assert!(is_ip_range("10.0.0.1-10.0.0.9"));
        assert!(is_ip_range("2001:db8::1-2001:db8::ff"));
        assert!(!is_ip_range("10.0.0.9-10.0.0.1"));
        assert!(!is_ip_range("10.0.0.1-2001:db8::1"));
        assert!(!is_ip_range("10.0.0.1"));
    }

    #[test]
    fn test_network_address_kind() {
        assert_eq!(network_address_kind("192.0.2.1").unwrap(), AddressKind::Host);
        assert_eq!(
            network_address_kind("192.0.2.0/24").unwrap(),
            AddressKind::Network
        );
        assert_eq!(
            network_address_kind("192.0.2.1-192.0.2.5").unwrap(),
            AddressKind::Range
        );
        assert!(matches!(
            network_address_kind("any"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_is_port_or_range() {
        assert!(is_port_or_range("443"));
        assert!(is_port_or_range("1024-65535"));
        assert!(!is_port_or_range("0"));
        assert!(!is_port_or_range("70000"));
        assert!(!is_port_or_range("9000-80"));
    }

    #[test]
    fn test_validate_vlan_range() {
        assert!(validate_vlan_range(10, 20).is_ok());
        assert!(validate_vlan_range(0, 20).is_err());
        assert!(validate_vlan_range(30, 20).is_err());
        assert!(validate_vlan_range(1, 4095).is_err());
    }
}
