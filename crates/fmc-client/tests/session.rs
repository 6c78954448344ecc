//! Integration tests for session handling through the public client API.
//!
//! A counting authenticator stands in for the FMC `auth` endpoints so the
//! tests can observe when tokens are generated, refreshed and revoked.

use async_trait::async_trait;
use fmc_client::{
    ApiDomain, Authenticator, DomainUuid, Error, FmcClientBuilder, Result, TokenSet,
};
use fmc_core::config::FmcClientConfig;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";

#[derive(Default)]
struct CountingAuthenticator {
    generated: AtomicU32,
    revoked: AtomicU32,
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn generate(&self) -> Result<TokenSet> {
        let n = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenSet::new(format!("token-{n}"), format!("refresh-{n}"))
            .with_domain(DomainUuid::parse_str(DOMAIN)?))
    }

    async fn refresh(&self, _tokens: &TokenSet) -> Result<TokenSet> {
        Err(Error::AuthenticationFailed("refresh not expected".into()))
    }

    async fn revoke(&self, _tokens: &TokenSet) -> Result<()> {
        self.revoked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config(server: &MockServer) -> FmcClientConfig {
    FmcClientConfig::new(server.uri(), "api", "secret")
        .unwrap()
        .with_rate_limit_delay(0)
}

#[tokio::test]
async fn rejected_token_is_replaced_by_a_new_one() {
    let server = MockServer::start().await;
    let hosts = format!("/api/fmc_config/v1/domain/{DOMAIN}/object/hosts/abc");
    Mock::given(method("GET"))
        .and(path(hosts.as_str()))
        .and(header("X-auth-access-token", "token-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(hosts.as_str()))
        .and(header("X-auth-access-token", "token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(CountingAuthenticator::default());
    let client = FmcClientBuilder::new(config(&server))
        .with_authenticator(auth.clone())
        .build()
        .unwrap();

    let host: Value = client
        .get_json(ApiDomain::Config, "object/hosts/abc", &[])
        .await
        .unwrap();
    assert_eq!(host["id"], "abc");
    assert_eq!(auth.generated.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clones_share_one_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/fmc_platform/v1/info/serverversion"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": [{"serverVersion": "7.4.1 (build 172)"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(CountingAuthenticator::default());
    let client = FmcClientBuilder::new(config(&server))
        .with_authenticator(auth.clone())
        .build()
        .unwrap();
    let clone = client.clone();

    client.connect().await.unwrap();
    clone.connect().await.unwrap();
    assert_eq!(auth.generated.load(Ordering::SeqCst), 1);

    clone.logout().await.unwrap();
    assert_eq!(auth.revoked.load(Ordering::SeqCst), 1);
    assert_eq!(client.token_manager().refresh_count().await, 0);
}
