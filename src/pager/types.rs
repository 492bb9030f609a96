//! Pager types
//!
//! Shared context, fetch outcomes and statistics for both strategies.

use crate::adapter::{HasMoreRule, ResponseAdapter};
use crate::dedup::Deduplicator;
use crate::fetch::PageFetcher;
use crate::types::PageNumber;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// How fetched items are written into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Concatenate onto the accumulated list
    Append,
    /// Replace the accumulated list
    Replace,
}

/// What a single pager call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The guard refused the call (already loading, exhausted or resetting)
    Skipped,
    /// Items were applied
    Loaded {
        /// Last page applied
        page: PageNumber,
        /// Items applied by this call
        items: usize,
        /// Whether another page may exist
        has_more: bool,
    },
    /// The page was empty; the session is exhausted
    Exhausted,
    /// The fetch failed and the message was stored
    Failed(String),
    /// A reset happened while the fetch was in flight; the result was dropped
    Discarded,
}

impl PageOutcome {
    /// Check if the call was refused by the guard
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Check if items were applied
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Check if the call failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Statistics for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Page requests that succeeded
    pub pages_fetched: usize,
    /// Items received across all pages
    pub items_received: usize,
    /// Items dropped by bulk de-duplication
    pub duplicates_dropped: usize,
    /// Failed fetch operations
    pub errors: usize,
    /// Results discarded because a reset superseded them
    pub stale_discarded: usize,
    /// Duration of the last completed fetch operation
    pub last_fetch: Option<Duration>,
}

impl SessionStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetched page
    pub fn add_page(&mut self, items: usize) {
        self.pages_fetched += 1;
        self.items_received += items;
    }

    /// Add dropped duplicates
    pub fn add_duplicates(&mut self, count: usize) {
        self.duplicates_dropped += count;
    }

    /// Add an error
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Add a discarded result
    pub fn add_stale(&mut self) {
        self.stale_discarded += 1;
    }

    /// Set last fetch duration
    pub fn set_last_fetch(&mut self, duration: Duration) {
        self.last_fetch = Some(duration);
    }
}

/// Everything a pager needs besides the store
pub struct PagerContext<R, T> {
    /// Page source
    pub fetcher: Arc<dyn PageFetcher<R>>,
    /// Item and total-page extraction
    pub adapter: Arc<dyn ResponseAdapter<R, T>>,
    /// Page size
    pub limit: u32,
    /// Continuation rule for sequential mode
    pub has_more: HasMoreRule<R, T>,
    /// Bulk-mode de-duplication
    pub dedup: Deduplicator<T>,
    stats: Mutex<SessionStats>,
}

impl<R, T> PagerContext<R, T> {
    /// Create a pager context
    pub fn new(
        fetcher: Arc<dyn PageFetcher<R>>,
        adapter: Arc<dyn ResponseAdapter<R, T>>,
        limit: u32,
        has_more: HasMoreRule<R, T>,
        dedup: Deduplicator<T>,
    ) -> Self {
        Self {
            fetcher,
            adapter,
            limit,
            has_more,
            dedup,
            stats: Mutex::new(SessionStats::new()),
        }
    }

    /// Copy of the statistics
    pub fn stats(&self) -> SessionStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update the statistics
    pub fn record(&self, f: impl FnOnce(&mut SessionStats)) {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Reset the statistics
    pub fn reset_stats(&self) {
        self.record(|stats| *stats = SessionStats::new());
    }
}

impl<R, T> std::fmt::Debug for PagerContext<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerContext")
            .field("limit", &self.limit)
            .field("has_more", &self.has_more)
            .finish_non_exhaustive()
    }
}
