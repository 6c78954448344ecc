//! HTTP client settings and rate-limit retry policy.
//!
//! This module provides the defaults and tunables used by the FMC dispatcher:
//! request timeouts, connection pooling, the sleep-and-retry policy applied to
//! HTTP 429 responses, paging limits, and token lifetime constants.

use std::time::Duration;

// Timeouts (in seconds)

/// Default timeout for FMC REST requests
pub const FMC_DEFAULT_TIMEOUT: u64 = 30;

/// Default connect timeout
pub const FMC_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Rate limiting

/// Default number of retries after an HTTP 429
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default sleep between retries after an HTTP 429, in seconds
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 30;

// Paging

/// Default page size requested for list calls (FMC maximum)
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

/// Default upper bound on followed `paging.next` links
pub const DEFAULT_MAX_PAGES: u32 = 100;

// Tokens

/// Lifetime of an FMC access token, in seconds
pub const TOKEN_LIFETIME_SECS: u64 = 30 * 60;

/// Renew tokens this many seconds before they expire
pub const TOKEN_RENEWAL_MARGIN_SECS: u64 = 60;

/// Refreshes allowed before a full token generation is required
pub const DEFAULT_MAX_TOKEN_REFRESHES: u32 = 3;

/// Retry policy applied to rate-limited requests.
///
/// The FMC answers HTTP 429 when a client exceeds 120 requests per minute.
/// The default policy sleeps a fixed delay between attempts; a multiplier
/// above one turns it into exponential backoff capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier (1 keeps the delay fixed)
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Create the default fixed-delay policy.
    #[must_use]
    pub const fn new() -> Self {
        Self::fixed(
            DEFAULT_MAX_RETRIES,
            Duration::from_secs(DEFAULT_RATE_LIMIT_DELAY_SECS),
        )
    }

    /// Create a policy that sleeps `delay` between up to `max_retries` retries.
    #[must_use]
    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1,
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculate delay for a given attempt number.
    ///
    /// delay = min(initial_delay * multiplier^(attempt - 1), max_delay)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let delay = self.initial_delay.saturating_mul(multiplier);

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds applied when following `paging.next` links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingPolicy {
    /// Page size requested from the FMC
    pub page_limit: u32,

    /// Maximum number of pages fetched for one list call
    pub max_pages: u32,
}

impl PagingPolicy {
    /// Create the default paging policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the maximum number of pages.
    #[must_use]
    pub const fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client configuration.
///
/// Configures timeouts, retries, paging and connection pooling.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Rate-limit retry policy
    pub retry_policy: RetryPolicy,

    /// Paging bounds
    pub paging: PagingPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Verify the FMC TLS certificate
    pub tls_verify: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(FMC_DEFAULT_TIMEOUT),
            retry_policy: RetryPolicy::new(),
            paging: PagingPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            tls_verify: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Set paging bounds.
    #[must_use]
    pub const fn with_paging(mut self, paging: PagingPolicy) -> Self {
        self.paging = paging;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
