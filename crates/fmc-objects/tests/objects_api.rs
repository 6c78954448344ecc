//! HTTP contract tests: each object type issues the expected verb, URL and
//! payload through the generic resource operations.

use fmc_client::{Error, FmcClient, ObjectId, ObjectRef};
use fmc_core::config::FmcClientConfig;
use fmc_objects::{
    Application, Host, InterfaceMode, NetworkGroup, ProtocolPortObject, SecurityZone, VlanTag,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";

fn object_path(collection: &str) -> String {
    format!("/api/fmc_config/v1/domain/{DOMAIN}/object/{collection}")
}

async fn connected_client(server: &MockServer) -> FmcClient {
    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("X-auth-access-token", "token")
                .insert_header("X-auth-refresh-token", "refresh")
                .insert_header("DOMAIN_UUID", DOMAIN),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fmc_platform/v1/info/serverversion"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": [{"serverVersion": "7.2.5 (build 208)"}]})),
        )
        .mount(server)
        .await;

    let config = FmcClientConfig::new(server.uri(), "api", "secret")
        .unwrap()
        .with_rate_limit_delay(0);
    FmcClient::new(config).unwrap()
}

#[tokio::test]
async fn create_host() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("POST"))
        .and(path(object_path("hosts").as_str()))
        .and(body_json(json!({"name": "web_01", "type": "Host", "value": "10.0.0.5"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "0050568A-0F3B-0ed3-0000-004294969001",
            "name": "web_01",
            "type": "Host",
            "value": "10.0.0.5",
            "overridable": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = client.create(&Host::new("web 01", "10.0.0.5").unwrap()).await.unwrap();
    assert_eq!(
        host.id.as_ref().map(ObjectId::as_str),
        Some("0050568A-0F3B-0ed3-0000-004294969001")
    );
    assert_eq!(host.overridable, Some(false));
}

#[tokio::test]
async fn host_without_value_is_rejected_locally() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    let host = Host {
        name: Some("web".into()),
        ..Host::default()
    };
    let err = client.create(&host).await.unwrap_err();
    assert!(matches!(err, Error::ValidationError(msg) if msg.contains("value")));
}

#[tokio::test]
async fn update_network_group() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    let group_path = format!("{}/GROUP-1", object_path("networkgroups"));
    Mock::given(method("PUT"))
        .and(path(group_path.as_str()))
        .and(body_json(json!({
            "id": "GROUP-1",
            "name": "servers",
            "type": "NetworkGroup",
            "objects": [{"id": "HOST-1", "type": "Host"}],
            "literals": [{"type": "Network", "value": "10.1.0.0/16"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "GROUP-1",
            "name": "servers",
            "type": "NetworkGroup",
            "objects": [{"id": "HOST-1", "type": "Host", "name": "web"}],
            "literals": [{"type": "Network", "value": "10.1.0.0/16"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut group = NetworkGroup::new("servers");
    group.id = Some(ObjectId::parse_str("GROUP-1").unwrap());
    group.add_object(ObjectRef::new(ObjectId::parse_str("HOST-1").unwrap(), "Host"));
    group.add_literal("10.1.0.0/16").unwrap();

    let updated = client.update(&group).await.unwrap();
    assert_eq!(updated.objects[0].name.as_deref(), Some("web"));
}

#[tokio::test]
async fn get_port_object_by_name() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("GET"))
        .and(path(object_path("protocolportobjects").as_str()))
        .and(query_param("expanded", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "P-1", "name": "HTTP", "type": "ProtocolPortObject", "protocol": "TCP", "port": "80"},
                {"id": "P-2", "name": "HTTPS", "type": "ProtocolPortObject", "protocol": "TCP", "port": "443"}
            ],
            "paging": {"offset": 0, "limit": 1000, "count": 2, "pages": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let template = ProtocolPortObject {
        name: Some("HTTPS".into()),
        ..ProtocolPortObject::default()
    };
    let https = client.get(&template).await.unwrap();
    assert_eq!(https.port.as_deref(), Some("443"));
}

#[tokio::test]
async fn delete_security_zone() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/ZONE-1", object_path("securityzones")).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ZONE-1",
            "name": "inside",
            "type": "SecurityZone",
            "interfaceMode": "ROUTED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut zone = SecurityZone::new("inside", InterfaceMode::Routed);
    zone.id = Some(ObjectId::parse_str("ZONE-1").unwrap());
    let deleted = client.delete(&zone).await.unwrap();
    assert_eq!(deleted.name.as_deref(), Some("inside"));
}

#[tokio::test]
async fn list_vlan_tags() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("GET"))
        .and(path(object_path("vlantags").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "V-1",
                "name": "voice",
                "type": "VlanTag",
                "data": {"startTag": 200, "endTag": 210, "type": "VlanTagLiteral"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tags = client.list(&VlanTag::default()).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].data.as_ref().map(|d| d.end_tag), Some(210));
}

#[tokio::test]
async fn applications_are_read_only() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    let mut app = Application::named("SSH");
    app.id = Some(ObjectId::parse_str("APP-1").unwrap());
    let err = client.delete(&app).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
    assert_eq!(
        app.to_ref().and_then(|r| r.name),
        Some("SSH".to_string())
    );
}
