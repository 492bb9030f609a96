//! Configuration types for feed definitions
//!
//! A feed config describes where pages come from and how a session
//! accumulates them. Loaded from YAML or JSON.

use crate::adapter::JsonAdapter;
use crate::dedup::Identity;
use crate::error::{Error, Result};
use crate::fetch::{HttpFetcherConfig, PageFetcher, RateLimiterConfig};
use crate::session::SessionConfig;
use crate::types::{
    FetchMode, PageNumber, StringMap, DEFAULT_ID_FIELD, DEFAULT_INITIAL_PAGE, DEFAULT_ITEMS_PATH,
    DEFAULT_LIMIT, DEFAULT_SCROLL_THRESHOLD, DEFAULT_TOTAL_PAGES_PATH,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Feed Config
// ============================================================================

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// HTTP source settings
    #[serde(default)]
    pub http: HttpSourceConfig,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Accumulation strategy
    #[serde(default)]
    pub mode: FetchMode,

    /// Scroll fraction that triggers the next page
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,

    /// First page requested
    #[serde(default = "default_initial_page")]
    pub initial_page: PageNumber,

    /// Field used to de-duplicate items
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Dot path to the item list in each response
    #[serde(default = "default_items_path")]
    pub items_path: String,

    /// Dot path to the total page count, if the API reports one
    #[serde(default = "default_total_pages_path")]
    pub total_pages_path: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_scroll_threshold() -> f64 {
    DEFAULT_SCROLL_THRESHOLD
}

fn default_initial_page() -> PageNumber {
    DEFAULT_INITIAL_PAGE
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

fn default_items_path() -> String {
    DEFAULT_ITEMS_PATH.to_string()
}

fn default_total_pages_path() -> Option<String> {
    Some(DEFAULT_TOTAL_PAGES_PATH.to_string())
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            http: HttpSourceConfig::default(),
            limit: default_limit(),
            mode: FetchMode::default(),
            scroll_threshold: default_scroll_threshold(),
            initial_page: default_initial_page(),
            id_field: default_id_field(),
            items_path: default_items_path(),
            total_pages_path: default_total_pages_path(),
        }
    }
}

// ============================================================================
// HTTP Source
// ============================================================================

/// Where pages are fetched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Base URL of the API
    #[serde(default)]
    pub base_url: String,

    /// Path appended to the base URL
    #[serde(default)]
    pub path: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the page size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Extra query parameters sent on every request
    #[serde(default)]
    pub query: StringMap,

    /// Headers sent on every request
    #[serde(default)]
    pub headers: StringMap,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path: String::new(),
            page_param: default_page_param(),
            limit_param: default_limit_param(),
            query: StringMap::new(),
            headers: StringMap::new(),
            timeout_seconds: default_timeout(),
            rate_limit: None,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl FeedConfig {
    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Check value ranges. A missing base URL is allowed here and reported
    /// when an HTTP fetcher is built.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::invalid_value("limit", "must be greater than zero"));
        }

        if !(self.scroll_threshold > 0.0 && self.scroll_threshold < 1.0) {
            return Err(Error::invalid_value(
                "scroll_threshold",
                format!(
                    "must be between 0 and 1 (exclusive), got {}",
                    self.scroll_threshold
                ),
            ));
        }

        if self.initial_page == 0 {
            return Err(Error::invalid_value("initial_page", "pages are numbered from 1"));
        }

        if self.id_field.trim().is_empty() {
            return Err(Error::invalid_value("id_field", "cannot be empty"));
        }

        let http = &self.http;
        if !http.base_url.is_empty() {
            Url::parse(&http.base_url).map_err(|e| {
                Error::invalid_value("http.base_url", format!("'{}': {}", http.base_url, e))
            })?;
        }
        if http.page_param.is_empty() {
            return Err(Error::invalid_value("http.page_param", "cannot be empty"));
        }
        if http.limit_param.is_empty() {
            return Err(Error::invalid_value("http.limit_param", "cannot be empty"));
        }
        if http.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Settings for an [`crate::fetch::HttpPageFetcher`]
    pub fn http_fetcher_config(&self) -> Result<HttpFetcherConfig> {
        let http = &self.http;
        if http.base_url.is_empty() {
            return Err(Error::invalid_value("http.base_url", "is required"));
        }

        let mut builder = HttpFetcherConfig::builder(http.base_url.clone())
            .path(http.path.clone())
            .params(http.page_param.clone(), http.limit_param.clone())
            .timeout(Duration::from_secs(http.timeout_seconds));
        for (key, value) in &http.query {
            builder = builder.query(key.clone(), value.clone());
        }
        for (key, value) in &http.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        if let Some(rate_limit) = &http.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }

        Ok(builder.build())
    }

    /// JSON adapter reading the configured paths
    pub fn adapter<T>(&self) -> JsonAdapter<T> {
        JsonAdapter::with_paths(self.items_path.clone(), self.total_pages_path.as_deref())
    }

    /// Session settings around `fetcher`
    pub fn session_config<T>(
        &self,
        fetcher: impl PageFetcher<Value> + 'static,
    ) -> SessionConfig<Value, T>
    where
        T: DeserializeOwned + 'static,
    {
        SessionConfig::new(fetcher, self.adapter::<T>())
            .with_limit(self.limit)
            .with_mode(self.mode)
            .with_scroll_threshold(self.scroll_threshold)
            .with_initial_page(self.initial_page)
            .with_identity(Identity::field(self.id_field.clone()))
    }
}
