//! HTTP page fetcher
//!
//! Issues `GET <base_url>/<path>?<page_param>=N&<limit_param>=M` and returns
//! the JSON body. Transport concerns stay here:
//! - Rate limiting to keep bulk bursts polite
//! - Status classification into [`Error::HttpStatus`]
//! - No retries; a failed page is reported and the caller decides

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::PageFetcher;
use crate::error::{Error, Result};
use crate::types::{PageNumber, StringMap};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP page fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Path appended to the base URL
    pub path: String,
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Query parameter carrying the page size
    pub limit_param: String,
    /// Extra query parameters sent on every request
    pub query: StringMap,
    /// Default headers for all requests
    pub headers: StringMap,
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: String::new(),
            page_param: "page".to_string(),
            limit_param: "limit".to_string(),
            query: StringMap::new(),
            headers: StringMap::new(),
            timeout: Duration::from_secs(30),
            rate_limit: None,
            user_agent: format!("pagefeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpFetcherConfig {
    /// Create a config builder for the given base URL
    pub fn builder(base_url: impl Into<String>) -> HttpFetcherConfigBuilder {
        HttpFetcherConfigBuilder {
            config: Self {
                base_url: base_url.into(),
                ..Self::default()
            },
        }
    }
}

/// Builder for HTTP fetcher config
#[derive(Debug, Default)]
pub struct HttpFetcherConfigBuilder {
    config: HttpFetcherConfig,
}

impl HttpFetcherConfigBuilder {
    /// Set the request path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the page and limit query parameter names
    pub fn params(mut self, page_param: impl Into<String>, limit_param: impl Into<String>) -> Self {
        self.config.page_param = page_param.into();
        self.config.limit_param = limit_param.into();
        self
    }

    /// Add an extra query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.query.insert(key.into(), value.into());
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpFetcherConfig {
        self.config
    }
}

/// Fetches JSON pages over HTTP
pub struct HttpPageFetcher {
    client: Client,
    endpoint: Url,
    config: HttpFetcherConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpPageFetcher {
    /// Create a fetcher, validating the endpoint URL
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a fetcher around an existing reqwest client
    pub fn with_client(config: HttpFetcherConfig, client: Client) -> Result<Self> {
        let endpoint = build_endpoint(&config.base_url, &config.path)?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            endpoint,
            config,
            rate_limiter,
        })
    }

    /// The resolved endpoint URL (without paging parameters)
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// URL for a specific page
    pub fn page_url(&self, page: PageNumber, limit: u32) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            let mut extra: Vec<_> = self.config.query.iter().collect();
            extra.sort();
            for (key, value) in extra {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(&self.config.page_param, &page.to_string());
            pairs.append_pair(&self.config.limit_param, &limit.to_string());
        }
        url
    }
}

#[async_trait]
impl PageFetcher<Value> for HttpPageFetcher {
    async fn fetch(&self, page: PageNumber, limit: u32) -> Result<Value> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let url = self.page_url(page, limit);
        let mut req = self.client.get(url.clone());
        for (key, value) in &self.config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Response for page {page} is not JSON: {e}")))?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(value)
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Join base URL and path into a parsed URL
fn build_endpoint(base_url: &str, path: &str) -> Result<Url> {
    if base_url.trim().is_empty() {
        return Err(Error::invalid_value("base_url", "must not be empty"));
    }

    let joined = if path.is_empty() {
        base_url.to_string()
    } else {
        let base = base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    };

    Ok(Url::parse(&joined)?)
}
