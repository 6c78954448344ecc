//! Integration tests for parsing FMC object documents.
//!
//! These tests validate that the fmc-objects models deserialize list and
//! detail responses as the FMC returns them, metadata and links included.

use fmc_core::types::ListResponse;
use fmc_objects::{InterfaceMode, NetworkGroup, SecurityZone};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_network_group_list() {
    let json_data = load_fixture("network_objects.json");
    let page: ListResponse<NetworkGroup> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize network groups: {e}"));

    assert!(page.next_url().is_none());
    assert_eq!(page.items.len(), 2);

    let rfc1918 = &page.items[0];
    assert_eq!(rfc1918.name.as_deref(), Some("rfc1918"));
    assert_eq!(rfc1918.objects.len(), 2);
    assert_eq!(rfc1918.literals[0].value.as_deref(), Some("192.168.0.0/16"));

    let metadata = rfc1918.metadata.as_ref().expect("metadata present");
    assert_eq!(
        metadata.timestamp.map(|ts| ts.timestamp_millis()),
        Some(1_696_452_103_000)
    );
    assert_eq!(
        metadata.last_user.as_ref().and_then(|u| u.name.as_deref()),
        Some("api-admin")
    );
    assert_eq!(metadata.read_only.as_ref().map(|r| r.state), Some(false));

    let dmz = &page.items[1];
    assert!(dmz.objects.is_empty());
    assert_eq!(dmz.literals[1].kind, "Range");
    assert_eq!(
        dmz.metadata.as_ref().and_then(|m| m.parent_type.as_deref()),
        Some("NetworkGroup")
    );
}

#[test]
fn test_deserialize_security_zone() {
    let json_data = load_fixture("security_zone.json");
    let zone: SecurityZone = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize security zone: {e}"));

    assert_eq!(zone.interface_mode, Some(InterfaceMode::Routed));
    assert_eq!(zone.interfaces.len(), 2);
    assert_eq!(zone.interfaces[1].kind, "SubInterface");
}

#[test]
fn test_returned_object_reserializes_without_metadata() {
    let json_data = load_fixture("security_zone.json");
    let zone: SecurityZone = serde_json::from_str(&json_data).unwrap();
    let value = serde_json::to_value(&zone).unwrap();

    assert!(value.get("metadata").is_none());
    assert!(value.get("links").is_none());
    assert_eq!(value["id"], "a1b2c3d4-0000-1111-2222-333344445555");
}
