//! Configuration structures for FMC clients.
//!
//! This module provides the connection configuration for an FMC session:
//! address and credentials, target domain, TLS, timeouts, rate-limit retries,
//! paging and token refresh bounds.

use crate::client::{
    ClientConfig, PagingPolicy, RetryPolicy, DEFAULT_MAX_PAGES, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_TOKEN_REFRESHES, DEFAULT_PAGE_LIMIT, DEFAULT_RATE_LIMIT_DELAY_SECS,
    FMC_DEFAULT_TIMEOUT,
};
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

/// Environment variable holding the FMC address.
pub const ENV_HOST: &str = "FMC_HOST";
/// Environment variable holding the API username.
pub const ENV_USERNAME: &str = "FMC_USERNAME";
/// Environment variable holding the API password.
pub const ENV_PASSWORD: &str = "FMC_PASSWORD";
/// Environment variable holding the domain name (optional).
pub const ENV_DOMAIN: &str = "FMC_DOMAIN";
/// Environment variable toggling TLS verification (optional).
pub const ENV_TLS_VERIFY: &str = "FMC_TLS_VERIFY";

/// Configuration for an FMC client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FmcClientConfig {
    /// FMC base URL (e.g. `https://fmc.example.com`)
    #[validate(url)]
    pub host: String,

    /// API username
    #[validate(length(min = 1))]
    pub username: String,

    /// API password
    #[serde(skip_serializing, default = "default_password")]
    pub password: SecretString,

    /// Domain name (e.g. `Global/Branches`); the token's default domain when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub domain: Option<String>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after HTTP 429
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sleep between rate-limit retries, in seconds
    #[validate(range(min = 0, max = 300))]
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: u64,

    /// Page size for list calls
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Maximum pages followed for one list call
    #[validate(range(min = 1, max = 10000))]
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Token refreshes before a full re-authentication
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_token_refreshes")]
    pub max_token_refreshes: u32,
}

fn default_password() -> SecretString {
    SecretString::from(String::new())
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    FMC_DEFAULT_TIMEOUT
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_rate_limit_delay_secs() -> u64 {
    DEFAULT_RATE_LIMIT_DELAY_SECS
}

const fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

const fn default_max_token_refreshes() -> u32 {
    DEFAULT_MAX_TOKEN_REFRESHES
}

/// Prefix bare hosts (`10.0.0.10`, `fmc.local:8443`) with `https://`.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

impl FmcClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `host` - FMC address; `https://` is assumed when no scheme is given
    /// * `username` - API user
    /// * `password` - API password
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid URL or validation fails.
    pub fn new(
        host: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            host: normalize_host(host.as_ref()),
            username: username.into(),
            password: SecretString::from(password.into()),
            domain: None,
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
            page_limit: default_page_limit(),
            max_pages: default_max_pages(),
            max_token_refreshes: default_max_token_refreshes(),
        };

        config.check()?;
        Ok(config)
    }

    /// Run the field validators, e.g. after `with_*` setters or
    /// deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the offending fields.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Build a configuration from `FMC_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::ConfigError(format!("Missing environment variable {key}")))
        };

        let mut config = Self::new(
            required(ENV_HOST)?,
            required(ENV_USERNAME)?,
            required(ENV_PASSWORD)?,
        )?;

        if let Some(domain) = lookup(ENV_DOMAIN).filter(|d| !d.trim().is_empty()) {
            config = config.with_domain(domain);
        }

        if let Some(raw) = lookup(ENV_TLS_VERIFY) {
            let verify = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::ConfigError(format!(
                        "Invalid {ENV_TLS_VERIFY} value `{other}`"
                    )))
                }
            };
            config = config.with_tls_verify(verify);
        }

        debug!(host = %config.host, domain = ?config.domain, "Loaded FMC configuration");
        Ok(config)
    }

    /// Target a named domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set rate-limit retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the rate-limit sleep in seconds.
    #[must_use]
    pub const fn with_rate_limit_delay(mut self, seconds: u64) -> Self {
        self.rate_limit_delay_secs = seconds;
        self
    }

    /// Set the page size for list calls.
    #[must_use]
    pub const fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the maximum number of pages followed.
    #[must_use]
    pub const fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the number of token refreshes allowed before re-authenticating.
    #[must_use]
    pub const fn with_max_token_refreshes(mut self, refreshes: u32) -> Self {
        self.max_token_refreshes = refreshes;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Password text for basic authentication.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Parse and validate the host URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_host(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.host)
            .map_err(|e| Error::ConfigError(format!("Invalid FMC host: {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Derive HTTP client settings from this configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.timeout())
            .with_tls_verify(self.tls_verify)
            .with_retry_policy(RetryPolicy::fixed(
                self.max_retries,
                Duration::from_secs(self.rate_limit_delay_secs),
            ))
            .with_paging(
                PagingPolicy::new()
                    .with_page_limit(self.page_limit)
                    .with_max_pages(self.max_pages),
            )
    }
}
