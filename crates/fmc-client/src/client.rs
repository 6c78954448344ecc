//! Asynchronous FMC client implementation.

use crate::auth::{Authenticator, HttpAuthenticator, TokenManager, ACCESS_TOKEN_HEADER};
use crate::Result;
use fmc_core::client::{ClientConfig, PagingPolicy, RetryPolicy, FMC_CONNECT_TIMEOUT};
use fmc_core::config::FmcClientConfig;
use fmc_core::error::FmcErrorBody;
use fmc_core::query::QueryParams;
use fmc_core::types::{ListResponse, CONFIG_PREFIX, PLATFORM_PREFIX};
use fmc_core::{ApiDomain, DomainUuid, Error, ServerVersion};
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("fmc-client/", env!("CARGO_PKG_VERSION"));

/// Builder for [`FmcClient`].
pub struct FmcClientBuilder {
    config: FmcClientConfig,
    http_config: ClientConfig,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl FmcClientBuilder {
    /// Create a new builder; HTTP settings are derived from `config`.
    #[must_use]
    pub fn new(config: FmcClientConfig) -> Self {
        Self {
            http_config: config.client_config(),
            config,
            authenticator: None,
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Override the rate-limit retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.http_config.retry_policy = policy;
        self
    }

    /// Override the paging bounds.
    #[must_use]
    pub fn with_paging(mut self, paging: PagingPolicy) -> Self {
        self.http_config.paging = paging;
        self
    }

    /// Use a custom token exchange instead of the FMC `auth` endpoints.
    #[must_use]
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Build the client instance. No request is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is out of range, the host URL
    /// is invalid or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<FmcClient> {
        self.config.check()?;
        let base_url = self.config.parse_host()?;

        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .connect_timeout(Duration::from_secs(FMC_CONNECT_TIMEOUT))
            .danger_accept_invalid_certs(!self.http_config.tls_verify);

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build FMC HTTP client: {err}"))
        })?;

        let authenticator = match self.authenticator {
            Some(authenticator) => authenticator,
            None => Arc::new(HttpAuthenticator::new(&self.config, http.clone())?),
        };
        let tokens = TokenManager::new(authenticator, self.config.max_token_refreshes);

        Ok(FmcClient {
            http,
            base_url,
            config: Arc::new(self.config),
            http_config: self.http_config,
            tokens: Arc::new(tokens),
            session: Arc::new(RwLock::new(Session::default())),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Session {
    domain: Option<DomainUuid>,
    version: Option<ServerVersion>,
}

/// Entry of `GET info/serverversion`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// FMC software version, e.g. `7.2.5 (build 208)`.
    #[serde(default)]
    pub server_version: Option<String>,
    /// Geolocation database version.
    #[serde(default)]
    pub geo_version: Option<String>,
    /// Vulnerability database version.
    #[serde(default)]
    pub vdb_version: Option<String>,
    /// Intrusion rule update version.
    #[serde(default)]
    pub sru_version: Option<String>,
}

/// Asynchronous client for the FMC REST API.
///
/// Clones share one session: the token set, the selected domain and the
/// cached server version.
#[derive(Clone)]
pub struct FmcClient {
    http: Client,
    base_url: Url,
    config: Arc<FmcClientConfig>,
    http_config: ClientConfig,
    tokens: Arc<TokenManager>,
    session: Arc<RwLock<Session>>,
}

impl FmcClient {
    /// Construct a client from a configuration with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid.
    pub fn new(config: FmcClientConfig) -> Result<Self> {
        FmcClientBuilder::new(config).build()
    }

    /// Authenticate, resolve the domain and read the server version.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, domain selection or the version
    /// request fails.
    pub async fn connect(&self) -> Result<()> {
        let domain = self.domain_uuid().await?;
        let version = self.server_version().await?;
        info!(host = %self.base_url, %domain, %version, "Connected to FMC");
        Ok(())
    }

    /// Obtain a valid token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the FMC refuses the credentials.
    pub async fn login(&self) -> Result<()> {
        self.tokens.tokens().await.map(|_| ())
    }

    /// Revoke the tokens and forget the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the FMC refuses the revocation.
    pub async fn logout(&self) -> Result<()> {
        self.update_session(|session| *session = Session::default());
        self.tokens.revoke().await?;
        info!(host = %self.base_url, "Logged out of FMC");
        Ok(())
    }

    /// Access the configured FMC base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Access the client configuration.
    #[must_use]
    pub fn config(&self) -> &FmcClientConfig {
        &self.config
    }

    /// Access the token manager shared by clones of this client.
    #[must_use]
    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// UUID of the domain every config request is scoped to.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails or the configured domain
    /// name is unknown.
    pub async fn domain_uuid(&self) -> Result<DomainUuid> {
        if let Some(domain) = self.session().domain {
            return Ok(domain);
        }
        let tokens = self.tokens.tokens().await?;
        let domain = tokens.resolve_domain(self.config.domain.as_deref())?;
        debug!(%domain, "Selected FMC domain");
        self.update_session(|session| session.domain = Some(domain));
        Ok(domain)
    }

    /// FMC software version, fetched once and cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub async fn server_version(&self) -> Result<ServerVersion> {
        if let Some(version) = self.session().version {
            return Ok(version);
        }
        let version = self.fetch_server_version().await?;
        self.update_session(|session| session.version = Some(version));
        Ok(version)
    }

    /// Read the version information without consulting the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no version.
    pub async fn fetch_server_version(&self) -> Result<ServerVersion> {
        let info = self.server_info().await?;
        let raw = info.server_version.ok_or_else(|| {
            Error::ParseError("FMC server information has no serverVersion".to_string())
        })?;
        ServerVersion::parse(&raw)
    }

    /// Read the `info/serverversion` entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is empty.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        let response: ListResponse<ServerInfo> = self
            .get_json(ApiDomain::Platform, "info/serverversion", &[])
            .await?;
        response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::ParseError("Empty FMC server version response".to_string()))
    }

    /// Absolute URL of `path` under the given API.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain cannot be resolved or the path is
    /// not a valid URL fragment.
    pub async fn api_url(&self, domain: ApiDomain, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let full = match domain {
            ApiDomain::Platform => format!("{PLATFORM_PREFIX}/{path}"),
            ApiDomain::Config => {
                let uuid = self.domain_uuid().await?;
                format!("{CONFIG_PREFIX}/domain/{uuid}/{path}")
            }
        };
        self.base_url
            .join(&full)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid FMC path `{full}`: {err}")))
    }

    /// GET a single document.
    ///
    /// # Errors
    ///
    /// Returns an error for non-success responses or undecodable bodies.
    pub async fn get_json<T>(
        &self,
        domain: ApiDomain,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = with_query(self.api_url(domain, path).await?, params);
        self.dispatch::<(), T>(Method::GET, url, None).await
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error for non-success responses or undecodable bodies.
    pub async fn post_json<B, R>(
        &self,
        domain: ApiDomain,
        path: &str,
        body: &B,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = with_query(self.api_url(domain, path).await?, params);
        self.dispatch(Method::POST, url, Some(body)).await
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error for non-success responses or undecodable bodies.
    pub async fn put_json<B, R>(
        &self,
        domain: ApiDomain,
        path: &str,
        body: &B,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = with_query(self.api_url(domain, path).await?, params);
        self.dispatch(Method::PUT, url, Some(body)).await
    }

    /// DELETE a document; the FMC answers with the deleted object.
    ///
    /// # Errors
    ///
    /// Returns an error for non-success responses or undecodable bodies.
    pub async fn delete_json<R>(
        &self,
        domain: ApiDomain,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = with_query(self.api_url(domain, path).await?, params);
        self.dispatch::<(), R>(Method::DELETE, url, None).await
    }

    /// GET every item of a collection, following `paging.next` links.
    ///
    /// Adds `expanded=true`, `offset=0` and the configured `limit` unless the
    /// caller already set them. Stops after the configured page bound and
    /// returns what was collected so far.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn get_all<T>(
        &self,
        domain: ApiDomain,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let paging = self.http_config.paging;
        let mut query = QueryParams::new();
        query.merge(params);
        query.merge(&[
            ("expanded", "true".to_string()),
            ("offset", "0".to_string()),
            ("limit", paging.page_limit.to_string()),
        ]);

        let mut url = with_query(self.api_url(domain, path).await?, &query.into_pairs());
        let mut items = Vec::new();
        let mut pages = 0u32;

        loop {
            let page: Option<ListResponse<T>> = self.dispatch::<(), _>(Method::GET, url, None).await?;
            pages += 1;

            let Some(page) = page else { break };
            let next = page.next_url().map(str::to_owned);
            items.extend(page.items);

            match next {
                None => break,
                Some(_) if pages >= paging.max_pages => {
                    warn!(
                        path,
                        pages,
                        collected = items.len(),
                        "FMC paging bound reached, returning partial results"
                    );
                    break;
                }
                Some(next) => url = self.rebase(&next)?,
            }
        }

        debug!(path, pages, count = items.len(), "FMC list complete");
        Ok(items)
    }

    /// Point a `paging.next` link at the configured host, keeping its path
    /// and query.
    fn rebase(&self, next: &str) -> Result<Url> {
        let parsed = self.base_url.join(next).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid FMC paging link `{next}`: {err}"))
        })?;
        let mut url = self.base_url.clone();
        url.set_path(parsed.path());
        url.set_query(parsed.query());
        Ok(url)
    }

    fn session(&self) -> Session {
        *self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_session(&self, update: impl FnOnce(&mut Session)) {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut session);
    }

    async fn dispatch<B, R>(&self, method: Method, url: Url, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let policy = self.http_config.retry_policy;
        let path = url.path().to_string();
        let mut attempt = 0u32;
        let mut reauthenticated = false;

        loop {
            let token = self.tokens.access_token().await?;
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(ACCESS_TOKEN_HEADER, token.expose_secret())
                .header(ACCEPT, "application/json");
            if let Some(payload) = body {
                request = request.json(payload);
            }

            debug!(%method, path = %path, attempt, "FMC request");

            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|err| {
                Error::HttpError(format!("Failed to read FMC response body: {err}"))
            })?;

            if status.is_success() {
                return deserialize_body(&path, status, &bytes);
            }

            let text = String::from_utf8_lossy(&bytes);
            match status {
                StatusCode::TOO_MANY_REQUESTS if attempt < policy.max_retries => {
                    attempt += 1;
                    let delay = policy.delay_for_attempt(attempt);
                    warn!(path = %path, attempt, ?delay, "FMC rate limit hit, retrying");
                    if delay > Duration::ZERO {
                        sleep(delay).await;
                    }
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(Error::RateLimited(format!(
                        "{method} {path} still rate limited after {attempt} retries: {}",
                        FmcErrorBody::describe(&text)
                    )));
                }
                StatusCode::UNAUTHORIZED if !reauthenticated => {
                    reauthenticated = true;
                    info!(path = %path, "FMC rejected the access token, re-authenticating");
                    self.tokens.invalidate().await;
                }
                _ => {
                    let err = Error::from_status(status, &text);
                    if err.should_log() {
                        error!(path = %path, %status, error = %err, "FMC request failed");
                    } else {
                        debug!(path = %path, %status, error = %err, "FMC request failed");
                    }
                    return Err(err);
                }
            }
        }
    }
}

fn with_query(mut url: Url, params: &[(&'static str, String)]) -> Url {
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    }
    url
}

fn deserialize_body<R>(path: &str, status: StatusCode, bytes: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    if status == StatusCode::NO_CONTENT || bytes.is_empty() {
        serde_json::from_value(serde_json::Value::Null).map_err(|err| {
            Error::ParseError(format!(
                "Failed to parse empty FMC response for `{path}`: {err}"
            ))
        })
    } else {
        serde_json::from_slice(bytes).map_err(|err| {
            Error::ParseError(format!("Failed to parse FMC response for `{path}`: {err}"))
        })
    }
}
