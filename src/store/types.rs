//! Accumulator state types

use crate::types::PageNumber;

/// Observable state of one accumulation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorState<T> {
    /// Everything accumulated so far, in arrival order
    pub items: Vec<T>,
    /// Last page confirmed to have more data after it
    pub current_page: PageNumber,
    /// Last page whose items were applied, if any
    pub last_loaded_page: Option<PageNumber>,
    /// A fetch is in flight
    pub loading: bool,
    /// No fetch attempt has completed since activation or reset
    pub initial_loading: bool,
    /// Another page may exist
    pub has_more: bool,
    /// Message from the last failed fetch
    pub error: Option<String>,
    /// Bumped on every reset; results from older generations are discarded
    pub generation: u64,
}

impl<T> AccumulatorState<T> {
    /// Fresh state starting at `initial_page`
    pub fn new(initial_page: PageNumber) -> Self {
        Self {
            items: Vec::new(),
            current_page: initial_page,
            last_loaded_page: None,
            loading: false,
            initial_loading: true,
            has_more: true,
            error: None,
            generation: 0,
        }
    }

    /// Number of accumulated items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if a sequential fetch would currently be accepted
    pub fn can_load_more(&self) -> bool {
        !self.loading && self.has_more
    }

    /// Page a "load next" request asks for.
    ///
    /// Before any page has loaded this is `initial_page`, so a failed first
    /// fetch is retried rather than skipped.
    pub fn next_page(&self, initial_page: PageNumber) -> PageNumber {
        self.last_loaded_page
            .map_or(initial_page, |_| self.current_page.saturating_add(1))
    }
}

/// Proof that a fetch was admitted by the store's guard
///
/// Carries the generation captured when the fetch started; a commit with a
/// stale ticket is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    /// Generation this fetch belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
