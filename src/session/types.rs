//! Session configuration

use crate::adapter::{HasMoreRule, JsonAdapter, ResponseAdapter};
use crate::dedup::Identity;
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::{
    FetchMode, PageNumber, DEFAULT_INITIAL_PAGE, DEFAULT_LIMIT, DEFAULT_SCROLL_THRESHOLD,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Everything needed to build a [`super::Session`]
pub struct SessionConfig<R, T> {
    /// Page source
    pub fetcher: Arc<dyn PageFetcher<R>>,
    /// Item and total-page extraction
    pub adapter: Arc<dyn ResponseAdapter<R, T>>,
    /// Page size passed to every fetch
    pub limit: u32,
    /// Accumulation strategy
    pub mode: FetchMode,
    /// Scroll fraction that triggers the next page
    pub scroll_threshold: f64,
    /// Continuation rule for sequential mode
    pub has_more: HasMoreRule<R, T>,
    /// First page requested after activation or reset
    pub initial_page: PageNumber,
    /// Identity used to drop duplicates in bulk mode
    pub identity: Identity<T>,
}

impl<R, T> SessionConfig<R, T> {
    /// Create a config with default settings
    pub fn new(
        fetcher: impl PageFetcher<R> + 'static,
        adapter: impl ResponseAdapter<R, T> + 'static,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            adapter: Arc::new(adapter),
            limit: DEFAULT_LIMIT,
            mode: FetchMode::default(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            has_more: HasMoreRule::default(),
            initial_page: DEFAULT_INITIAL_PAGE,
            identity: Identity::default(),
        }
    }

    /// Set page size
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set accumulation strategy
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set scroll threshold
    pub fn with_scroll_threshold(mut self, threshold: f64) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    /// Set continuation rule
    pub fn with_has_more(mut self, rule: HasMoreRule<R, T>) -> Self {
        self.has_more = rule;
        self
    }

    /// Set first page
    pub fn with_initial_page(mut self, page: PageNumber) -> Self {
        self.initial_page = page;
        self
    }

    /// Set de-duplication identity
    pub fn with_identity(mut self, identity: Identity<T>) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the adapter
    pub fn with_adapter(mut self, adapter: impl ResponseAdapter<R, T> + 'static) -> Self {
        self.adapter = Arc::new(adapter);
        self
    }

    /// Validate the settings
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
        if let Identity::Field(field) = &self.identity {
            if field.trim().is_empty() {
                return Err(Error::invalid_value("identity", "field name cannot be empty"));
            }
        }
        Ok(())
    }
}

impl<T: DeserializeOwned + 'static> SessionConfig<Value, T> {
    /// Config for a JSON API using the default response layout
    pub fn json(fetcher: impl PageFetcher<Value> + 'static) -> Self {
        Self::new(fetcher, JsonAdapter::<T>::new())
    }
}

impl<R, T> std::fmt::Debug for SessionConfig<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("limit", &self.limit)
            .field("mode", &self.mode)
            .field("scroll_threshold", &self.scroll_threshold)
            .field("has_more", &self.has_more)
            .field("initial_page", &self.initial_page)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
