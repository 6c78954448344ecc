//! Token acquisition and renewal.
//!
//! The FMC issues an access token valid for 30 minutes together with a
//! refresh token. An access token can be refreshed three times; after that a
//! new pair must be generated with the user's credentials. [`TokenManager`]
//! hides these rules behind a single "current valid token" accessor.

use crate::Result;
use async_trait::async_trait;
use fmc_core::client::{TOKEN_LIFETIME_SECS, TOKEN_RENEWAL_MARGIN_SECS};
use fmc_core::config::FmcClientConfig;
use fmc_core::types::PLATFORM_PREFIX;
use fmc_core::{DomainUuid, Error};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Header carrying the access token on every request.
pub const ACCESS_TOKEN_HEADER: &str = "X-auth-access-token";
/// Header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "X-auth-refresh-token";
/// Header carrying the default domain UUID.
pub const DOMAIN_UUID_HEADER: &str = "DOMAIN_UUID";
/// Header carrying the JSON list of accessible domains.
pub const DOMAINS_HEADER: &str = "DOMAINS";

/// Domain entry from the `DOMAINS` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainInfo {
    /// Domain path (e.g. `Global/Branches`).
    pub name: String,
    /// Domain UUID.
    pub uuid: DomainUuid,
}

/// Tokens and domain information returned by the FMC.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Access token sent with every request.
    pub access_token: SecretString,
    /// Refresh token used to extend the session.
    pub refresh_token: SecretString,
    /// Default domain of the user.
    pub domain_uuid: Option<DomainUuid>,
    /// Domains the user can access.
    pub domains: Vec<DomainInfo>,
}

impl TokenSet {
    /// Create a token set without domain information.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            domain_uuid: None,
            domains: Vec::new(),
        }
    }

    /// Attach the default domain.
    #[must_use]
    pub fn with_domain(mut self, uuid: DomainUuid) -> Self {
        self.domain_uuid = Some(uuid);
        self
    }

    /// Attach the accessible domains.
    #[must_use]
    pub fn with_domains(mut self, domains: Vec<DomainInfo>) -> Self {
        self.domains = domains;
        self
    }

    /// Pick the domain to work in.
    ///
    /// A configured name must match one of the reported domains
    /// (case-insensitive); without a name the default domain is used.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown domain name, or when the FMC reported
    /// no default domain.
    pub fn resolve_domain(&self, name: Option<&str>) -> Result<DomainUuid> {
        match name {
            Some(name) => self
                .domains
                .iter()
                .find(|domain| domain.name.eq_ignore_ascii_case(name))
                .map(|domain| domain.uuid)
                .ok_or_else(|| {
                    let known: Vec<&str> = self.domains.iter().map(|d| d.name.as_str()).collect();
                    Error::ConfigError(format!(
                        "Domain `{name}` not found; available: {}",
                        known.join(", ")
                    ))
                }),
            None => self.domain_uuid.ok_or_else(|| {
                Error::AuthenticationFailed("FMC did not report a domain UUID".to_string())
            }),
        }
    }

    /// Keep domain details from `previous` when a refresh response omits them.
    fn inherit_domains(mut self, previous: &Self) -> Self {
        if self.domain_uuid.is_none() {
            self.domain_uuid = previous.domain_uuid;
        }
        if self.domains.is_empty() {
            self.domains = previous.domains.clone();
        }
        self
    }
}

/// Token exchange with the FMC.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Generate a new token pair from credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the response
    /// carries no token.
    async fn generate(&self) -> Result<TokenSet>;

    /// Exchange the current pair for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the FMC refuses the refresh.
    async fn refresh(&self, tokens: &TokenSet) -> Result<TokenSet>;

    /// Invalidate the current pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn revoke(&self, tokens: &TokenSet) -> Result<()>;
}

/// [`Authenticator`] backed by the FMC platform `auth` endpoints.
#[derive(Clone)]
pub struct HttpAuthenticator {
    http: Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl HttpAuthenticator {
    /// Create an authenticator for the configured FMC.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid.
    pub fn new(config: &FmcClientConfig, http: Client) -> Result<Self> {
        Ok(Self {
            http,
            base_url: config.parse_host()?,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn auth_url(&self, action: &str) -> Result<Url> {
        let path = format!("{PLATFORM_PREFIX}/auth/{action}");
        self.base_url
            .join(&path)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid FMC auth path `{path}`: {err}")))
    }

    async fn exchange(&self, request: reqwest::RequestBuilder, action: &str) -> Result<TokenSet> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return tokens_from_headers(response.headers());
        }

        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Err(Error::AuthenticationFailed(format!(
                "FMC rejected {action}: {}",
                fmc_core::error::FmcErrorBody::describe(&text)
            ))),
            _ => Err(Error::from_status(status, &text)),
        }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn generate(&self) -> Result<TokenSet> {
        let url = self.auth_url("generatetoken")?;
        debug!(user = %self.username, "Generating FMC access token");
        let request = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()));
        self.exchange(request, "token generation").await
    }

    async fn refresh(&self, tokens: &TokenSet) -> Result<TokenSet> {
        let url = self.auth_url("refreshtoken")?;
        debug!("Refreshing FMC access token");
        let request = self
            .http
            .post(url)
            .header(ACCESS_TOKEN_HEADER, tokens.access_token.expose_secret())
            .header(REFRESH_TOKEN_HEADER, tokens.refresh_token.expose_secret());
        let refreshed = self.exchange(request, "token refresh").await?;
        Ok(refreshed.inherit_domains(tokens))
    }

    async fn revoke(&self, tokens: &TokenSet) -> Result<()> {
        let url = self.auth_url("revokeaccess")?;
        let response = self
            .http
            .post(url)
            .header(ACCESS_TOKEN_HEADER, tokens.access_token.expose_secret())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(Error::from_status(status, &text))
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn tokens_from_headers(headers: &HeaderMap) -> Result<TokenSet> {
    let access = header_str(headers, ACCESS_TOKEN_HEADER).ok_or_else(|| {
        Error::AuthenticationFailed(format!("Response is missing {ACCESS_TOKEN_HEADER}"))
    })?;
    let refresh = header_str(headers, REFRESH_TOKEN_HEADER).ok_or_else(|| {
        Error::AuthenticationFailed(format!("Response is missing {REFRESH_TOKEN_HEADER}"))
    })?;

    let mut tokens = TokenSet::new(access, refresh);

    if let Some(raw) = header_str(headers, DOMAIN_UUID_HEADER) {
        match DomainUuid::parse_str(raw) {
            Ok(uuid) => tokens = tokens.with_domain(uuid),
            Err(err) => warn!(error = %err, "Ignoring malformed {DOMAIN_UUID_HEADER} header"),
        }
    }

    if let Some(raw) = header_str(headers, DOMAINS_HEADER) {
        match serde_json::from_str::<Vec<DomainInfo>>(raw) {
            Ok(domains) => tokens = tokens.with_domains(domains),
            Err(err) => warn!(error = %err, "Ignoring malformed {DOMAINS_HEADER} header"),
        }
    }

    Ok(tokens)
}

struct TokenState {
    tokens: TokenSet,
    issued_at: Instant,
    refresh_count: u32,
}

/// Keeps a valid token pair, generating or refreshing it on demand.
pub struct TokenManager {
    authenticator: Arc<dyn Authenticator>,
    state: Mutex<Option<TokenState>>,
    lifetime: Duration,
    renewal_margin: Duration,
    max_refreshes: u32,
}

impl TokenManager {
    /// Create a manager allowing `max_refreshes` refreshes per generated pair.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>, max_refreshes: u32) -> Self {
        Self {
            authenticator,
            state: Mutex::new(None),
            lifetime: Duration::from_secs(TOKEN_LIFETIME_SECS),
            renewal_margin: Duration::from_secs(TOKEN_RENEWAL_MARGIN_SECS),
            max_refreshes,
        }
    }

    /// Override the token lifetime and renewal margin.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration, renewal_margin: Duration) -> Self {
        self.lifetime = lifetime;
        self.renewal_margin = renewal_margin;
        self
    }

    fn renewal_due(&self, state: &TokenState, now: Instant) -> bool {
        now.saturating_duration_since(state.issued_at) + self.renewal_margin >= self.lifetime
    }

    /// Return a token set that is valid now, renewing it when needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a new token cannot be generated.
    pub async fn tokens(&self) -> Result<TokenSet> {
        let mut guard = self.state.lock().await;
        let now = Instant::now();

        let renewed = match guard.take() {
            Some(state) if !self.renewal_due(&state, now) => state,
            Some(state) if state.refresh_count < self.max_refreshes => {
                match self.authenticator.refresh(&state.tokens).await {
                    Ok(tokens) => {
                        debug!(refresh = state.refresh_count + 1, "FMC token refreshed");
                        TokenState {
                            tokens,
                            issued_at: now,
                            refresh_count: state.refresh_count + 1,
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "FMC token refresh failed, generating a new token");
                        self.generate(now).await?
                    }
                }
            }
            Some(_) => {
                info!("FMC token refresh limit reached, generating a new token");
                self.generate(now).await?
            }
            None => self.generate(now).await?,
        };

        let tokens = renewed.tokens.clone();
        *guard = Some(renewed);
        Ok(tokens)
    }

    /// Return the current access token.
    ///
    /// # Errors
    ///
    /// Returns an error if a new token cannot be generated.
    pub async fn access_token(&self) -> Result<SecretString> {
        Ok(self.tokens().await?.access_token)
    }

    /// Drop the current tokens so the next access generates a new pair.
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }

    /// Revoke and drop the current tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the FMC refuses the revocation.
    pub async fn revoke(&self) -> Result<()> {
        let state = self.state.lock().await.take();
        match state {
            Some(state) => self.authenticator.revoke(&state.tokens).await,
            None => Ok(()),
        }
    }

    /// Number of refreshes applied to the current pair.
    pub async fn refresh_count(&self) -> u32 {
        self.state
            .lock()
            .await
            .as_ref()
            .map_or(0, |state| state.refresh_count)
    }

    async fn generate(&self, now: Instant) -> Result<TokenState> {
        let tokens = self.authenticator.generate().await?;
        info!("FMC token generated");
        Ok(TokenState {
            tokens,
            issued_at: now,
            refresh_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{basic_auth, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOMAIN: &str = "e276abec-e0f2-11e3-8169-6d9ed49b625f";
    const CHILD_DOMAIN: &str = "5f2a8b1c-0d3e-4f50-8a6b-7c8d9e0f1a2b";

    fn token_response(access: &str, refresh: &str) -> ResponseTemplate {
        ResponseTemplate::new(204)
            .insert_header(ACCESS_TOKEN_HEADER, access)
            .insert_header(REFRESH_TOKEN_HEADER, refresh)
            .insert_header(DOMAIN_UUID_HEADER, DOMAIN)
            .insert_header(
                DOMAINS_HEADER,
                format!(
                    r#"[{{"name":"Global","uuid":"{DOMAIN}"}},{{"name":"Global/Lab","uuid":"{CHILD_DOMAIN}"}}]"#
                )
                .as_str(),
            )
    }

    fn authenticator(server: &MockServer) -> HttpAuthenticator {
        let config = FmcClientConfig::new(server.uri(), "api", "secret").unwrap();
        HttpAuthenticator::new(&config, Client::new()).unwrap()
    }

    fn domain() -> DomainUuid {
        DomainUuid::parse_str(DOMAIN).unwrap()
    }

    #[tokio::test]
    async fn generate_reads_tokens_and_domains_from_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fmc_platform/v1/auth/generatetoken"))
            .and(basic_auth("api", "secret"))
            .respond_with(token_response("access-1", "refresh-1"))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = authenticator(&server).generate().await.unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "access-1");
        assert_eq!(tokens.refresh_token.expose_secret(), "refresh-1");
        assert_eq!(tokens.domain_uuid, Some(domain()));
        assert_eq!(tokens.domains.len(), 2);
        assert_eq!(
            tokens.resolve_domain(Some("global/lab")).unwrap().to_string(),
            CHILD_DOMAIN
        );
    }

    #[tokio::test]
    async fn generate_with_bad_credentials_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fmc_platform/v1/auth/generatetoken"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = authenticator(&server).generate().await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn generate_without_token_header_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fmc_platform/v1/auth/generatetoken"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = authenticator(&server).generate().await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(msg) if msg.contains(ACCESS_TOKEN_HEADER)));
    }

    #[tokio::test]
    async fn refresh_sends_both_tokens_and_keeps_domains() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fmc_platform/v1/auth/refreshtoken"))
            .and(header(ACCESS_TOKEN_HEADER, "access-1"))
            .and(header(REFRESH_TOKEN_HEADER, "refresh-1"))
            .respond_with(
                ResponseTemplate::new(204)
                    .insert_header(ACCESS_TOKEN_HEADER, "access-2")
                    .insert_header(REFRESH_TOKEN_HEADER, "refresh-2"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let current = TokenSet::new("access-1", "refresh-1").with_domain(domain());
        let refreshed = authenticator(&server).refresh(&current).await.unwrap();
        assert_eq!(refreshed.access_token.expose_secret(), "access-2");
        assert_eq!(refreshed.domain_uuid, Some(domain()));
    }

    #[tokio::test]
    async fn revoke_posts_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fmc_platform/v1/auth/revokeaccess"))
            .and(header(ACCESS_TOKEN_HEADER, "access-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        authenticator(&server)
            .revoke(&TokenSet::new("access-1", "refresh-1"))
            .await
            .unwrap();
    }

    #[test]
    fn malformed_domain_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("a"));
        headers.insert(REFRESH_TOKEN_HEADER, HeaderValue::from_static("r"));
        headers.insert(DOMAIN_UUID_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(DOMAINS_HEADER, HeaderValue::from_static("{broken"));

        let tokens = tokens_from_headers(&headers).unwrap();
        assert!(tokens.domain_uuid.is_none());
        assert!(tokens.domains.is_empty());
    }

    #[test]
    fn resolve_domain_unknown_name() {
        let tokens = TokenSet::new("a", "r").with_domains(vec![DomainInfo {
            name: "Global".into(),
            uuid: domain(),
        }]);
        let err = tokens.resolve_domain(Some("Global/Nope")).unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("Global/Nope")));
    }

    #[test]
    fn resolve_domain_without_default() {
        let err = TokenSet::new("a", "r").resolve_domain(None).unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
    }

    fn expiring_manager(mock: MockAuthenticator, max_refreshes: u32) -> TokenManager {
        TokenManager::new(Arc::new(mock), max_refreshes)
            .with_lifetime(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn fresh_token_is_reused() {
        let mut mock = MockAuthenticator::new();
        mock.expect_generate()
            .times(1)
            .returning(|| Ok(TokenSet::new("access-1", "refresh-1")));
        mock.expect_refresh().never();

        let manager = TokenManager::new(Arc::new(mock), 3);
        for _ in 0..3 {
            let token = manager.access_token().await.unwrap();
            assert_eq!(token.expose_secret(), "access-1");
        }
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_up_to_the_limit_then_regenerated() {
        let mut mock = MockAuthenticator::new();
        mock.expect_generate()
            .times(2)
            .returning(|| Ok(TokenSet::new("generated", "refresh")));
        mock.expect_refresh()
            .times(3)
            .returning(|_| Ok(TokenSet::new("refreshed", "refresh")));

        let manager = expiring_manager(mock, 3);

        assert_eq!(manager.access_token().await.unwrap().expose_secret(), "generated");
        for expected in 1..=3 {
            assert_eq!(manager.access_token().await.unwrap().expose_secret(), "refreshed");
            assert_eq!(manager.refresh_count().await, expected);
        }
        assert_eq!(manager.access_token().await.unwrap().expose_secret(), "generated");
        assert_eq!(manager.refresh_count().await, 0);
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_generate() {
        let mut mock = MockAuthenticator::new();
        mock.expect_generate()
            .times(2)
            .returning(|| Ok(TokenSet::new("generated", "refresh")));
        mock.expect_refresh()
            .times(1)
            .returning(|_| Err(Error::Unauthorized("refresh token expired".into())));

        let manager = expiring_manager(mock, 3);
        manager.access_token().await.unwrap();
        assert_eq!(manager.access_token().await.unwrap().expose_secret(), "generated");
        assert_eq!(manager.refresh_count().await, 0);
    }

    #[tokio::test]
    async fn invalidate_forces_generation() {
        let mut mock = MockAuthenticator::new();
        mock.expect_generate()
            .times(2)
            .returning(|| Ok(TokenSet::new("generated", "refresh")));

        let manager = TokenManager::new(Arc::new(mock), 3);
        manager.access_token().await.unwrap();
        manager.invalidate().await;
        manager.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn generation_failure_is_reported() {
        let mut mock = MockAuthenticator::new();
        mock.expect_generate()
            .times(1)
            .returning(|| Err(Error::AuthenticationFailed("bad credentials".into())));

        let manager = TokenManager::new(Arc::new(mock), 3);
        let err = manager.access_token().await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn revoke_without_session_is_a_no_op() {
        let mut mock = MockAuthenticator::new();
        mock.expect_revoke().never();
        let manager = TokenManager::new(Arc::new(mock), 3);
        manager.revoke().await.unwrap();
    }

    #[test]
    fn refresh_count_starts_at_zero() {
        let manager = TokenManager::new(Arc::new(MockAuthenticator::new()), 3);
        assert_eq!(tokio_test::block_on(manager.refresh_count()), 0);
    }
}
