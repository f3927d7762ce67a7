//! HTTP fetch client with dependency tagging.

use serde::de::DeserializeOwned;

use crate::dependency::DependencyTag;
use crate::retry::RetryPolicy;
use crate::timeout::TimeoutConfig;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// A failure another attempt might not repeat.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => (500..600).contains(status),
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Deserialization(_) | Self::Request(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Fetch policy combining timeout and retry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Timeout configuration.
    pub timeout: TimeoutConfig,
    /// Retry policy.
    pub retry: RetryPolicy,
}

impl FetchPolicy {
    /// Create a new fetch policy.
    pub fn new(timeout: TimeoutConfig, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Create from a dependency tag's defaults.
    pub fn from_tag(tag: DependencyTag) -> Self {
        Self {
            timeout: TimeoutConfig::from_total(tag.default_timeout()),
            retry: RetryPolicy::new(tag.default_max_retries()),
        }
    }
}

/// Storefront API fetch client.
///
/// Provides automatic timeout and retry for outbound GET requests against a
/// single base URL.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    base_url: String,
    default_policy: Option<FetchPolicy>,
}

impl FetchClient {
    /// Create a new fetch client for `base_url` (e.g. `http://localhost:3333`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_connect_timeout(base_url, TimeoutConfig::default())
    }

    /// Create a client whose connection timeout comes from `timeout`.
    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        timeout: TimeoutConfig,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout.connect)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_policy: None,
        })
    }

    /// Set a policy used for every fetch instead of the per-tag defaults.
    pub fn with_default_policy(mut self, policy: FetchPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch with automatic timeout and retry based on dependency tag.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        tag: DependencyTag,
    ) -> Result<T, FetchError> {
        let policy = self
            .default_policy
            .clone()
            .unwrap_or_else(|| FetchPolicy::from_tag(tag));
        self.fetch_with_policy(path, tag, &policy).await
    }

    /// Fetch with explicit policy override.
    pub async fn fetch_with_policy<T: DeserializeOwned>(
        &self,
        path: &str,
        tag: DependencyTag,
        policy: &FetchPolicy,
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            let started = std::time::Instant::now();
            let result = self.attempt(&url, policy).await;

            match result {
                Ok(value) => {
                    tracing::debug!(
                        dependency = %tag,
                        %url,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "fetch succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if policy.retry.should_retry(&e, attempt) => {
                    let delay = policy.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(
                        dependency = %tag,
                        %url,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(dependency = %tag, %url, attempt, error = %e, "fetch failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        url: &str,
        policy: &FetchPolicy,
    ) -> Result<T, FetchError> {
        let total = policy.timeout.total;
        tokio::time::timeout(total, self.send_once(url))
            .await
            .map_err(|_| FetchError::Timeout(format!("{url} after {total:?}")))?
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.http.get(url).send().await?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Http {
                status,
                url: url.to_string(),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Deserialization(e.to_string()))
    }
}
