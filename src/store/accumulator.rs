//! Accumulator store implementation
//!
//! The store is the only mutator of [`AccumulatorState`]. State lives inside
//! a `tokio::sync::watch` channel: every mutation runs under the channel's
//! lock and observers are notified after it.

use super::types::{AccumulatorState, FetchTicket};
use crate::types::PageNumber;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;

/// Narrow write access to the state, handed out by the store
///
/// Pagers only ever see this view, inside [`AccumulatorStore::commit`].
pub struct StateWriter<'a, T> {
    state: &'a mut AccumulatorState<T>,
}

impl<'a, T> StateWriter<'a, T> {
    fn new(state: &'a mut AccumulatorState<T>) -> Self {
        Self { state }
    }

    /// Items accumulated so far
    pub fn items(&self) -> &[T] {
        &self.state.items
    }

    /// Concatenate items, preserving arrival order
    pub fn append(&mut self, items: Vec<T>) {
        self.state.items.extend(items);
    }

    /// Discard prior items and keep these
    pub fn replace(&mut self, items: Vec<T>) {
        self.state.items = items;
    }

    /// Record a fetch failure
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state.error = Some(message.into());
    }

    /// Clear the last failure
    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    /// Set the in-flight flag
    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// Set whether another page may exist
    pub fn set_has_more(&mut self, has_more: bool) {
        self.state.has_more = has_more;
    }

    /// Set the page cursor
    pub fn set_page(&mut self, page: PageNumber) {
        self.state.current_page = page;
    }

    /// Record the last page whose items were applied
    pub fn set_last_loaded_page(&mut self, page: PageNumber) {
        self.state.last_loaded_page = Some(page);
    }

    /// Mark the first fetch attempt as completed
    pub fn finish_initial_load(&mut self) {
        self.state.initial_loading = false;
    }

    fn reset(&mut self, initial_page: PageNumber) {
        let generation = self.state.generation.wrapping_add(1);
        *self.state = AccumulatorState::new(initial_page);
        self.state.generation = generation;
    }
}

/// Single source of truth for one session's accumulated data
#[derive(Debug)]
pub struct AccumulatorStore<T> {
    tx: watch::Sender<AccumulatorState<T>>,
    initial_page: PageNumber,
    resetting: AtomicBool,
}

impl<T> AccumulatorStore<T> {
    /// Create a store starting at `initial_page`
    pub fn new(initial_page: PageNumber) -> Self {
        let (tx, _rx) = watch::channel(AccumulatorState::new(initial_page));
        Self {
            tx,
            initial_page,
            resetting: AtomicBool::new(false),
        }
    }

    /// Page the store resets to
    pub fn initial_page(&self) -> PageNumber {
        self.initial_page
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Read the state without cloning it
    pub fn with_state<U>(&self, f: impl FnOnce(&AccumulatorState<T>) -> U) -> U {
        f(&self.tx.borrow())
    }

    /// Receive every state transition
    pub fn subscribe(&self) -> watch::Receiver<AccumulatorState<T>> {
        self.tx.subscribe()
    }

    /// Check if a reset/refresh is underway
    pub fn is_resetting(&self) -> bool {
        self.resetting.load(Ordering::Acquire)
    }

    // ========================================================================
    // Narrow setters
    // ========================================================================

    /// Concatenate items, preserving arrival order. No de-duplication.
    pub fn append(&self, items: Vec<T>) {
        self.tx.send_modify(|s| StateWriter::new(s).append(items));
    }

    /// Discard prior items and keep these
    pub fn replace(&self, items: Vec<T>) {
        self.tx.send_modify(|s| StateWriter::new(s).replace(items));
    }

    /// Record a fetch failure
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|s| StateWriter::new(s).set_error(message));
    }

    /// Clear the last failure
    pub fn clear_error(&self) {
        self.tx.send_modify(|s| StateWriter::new(s).clear_error());
    }

    /// Set the in-flight flag
    pub fn set_loading(&self, loading: bool) {
        self.tx.send_modify(|s| StateWriter::new(s).set_loading(loading));
    }

    /// Set whether another page may exist
    pub fn set_has_more(&self, has_more: bool) {
        self.tx.send_modify(|s| StateWriter::new(s).set_has_more(has_more));
    }

    /// Set the page cursor
    pub fn set_page(&self, page: PageNumber) {
        self.tx.send_modify(|s| StateWriter::new(s).set_page(page));
    }

    /// Mark the first fetch attempt as completed
    pub fn finish_initial_load(&self) {
        self.tx.send_modify(|s| StateWriter::new(s).finish_initial_load());
    }

    /// Clear everything back to a fresh session and invalidate in-flight fetches
    pub fn reset_all(&self) {
        let initial_page = self.initial_page;
        self.tx.send_modify(|s| StateWriter::new(s).reset(initial_page));
        self.resetting.store(false, Ordering::Release);
        debug!(generation = self.generation(), "Accumulator reset");
    }

    // ========================================================================
    // Fetch coordination
    // ========================================================================

    /// Admit a fetch if none is in flight (and, with `require_more`, more
    /// data may exist). Sets `loading` and clears `error` when admitted.
    pub fn try_begin_fetch(&self, require_more: bool) -> Option<FetchTicket> {
        let mut ticket = None;
        self.tx.send_if_modified(|s| {
            if s.loading || (require_more && !s.has_more) || self.is_resetting() {
                return false;
            }
            s.loading = true;
            s.error = None;
            ticket = Some(FetchTicket::new(s.generation));
            true
        });
        ticket
    }

    /// Reset and admit the replacement fetch in one step.
    ///
    /// The resetting guard stays raised until [`Self::end_refresh`].
    pub fn begin_refresh(&self) -> FetchTicket {
        let initial_page = self.initial_page;
        let mut ticket = FetchTicket::new(0);
        self.tx.send_modify(|s| {
            StateWriter::new(s).reset(initial_page);
            s.loading = true;
            ticket = FetchTicket::new(s.generation);
        });
        self.resetting.store(true, Ordering::Release);
        debug!(generation = ticket.generation(), "Refresh started");
        ticket
    }

    /// Lower the resetting guard if `ticket` still owns the session
    pub fn end_refresh(&self, ticket: &FetchTicket) {
        if self.is_current(ticket) {
            self.resetting.store(false, Ordering::Release);
        }
    }

    /// Check if results for `ticket` would still be applied
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generation() == ticket.generation()
    }

    /// Apply `f` if `ticket` is still current.
    ///
    /// Returns `false` (and leaves the state untouched) when a reset has
    /// happened since the fetch started.
    pub fn commit(&self, ticket: &FetchTicket, f: impl FnOnce(&mut StateWriter<'_, T>)) -> bool {
        self.tx.send_if_modified(|s| {
            if s.generation != ticket.generation() {
                return false;
            }
            f(&mut StateWriter::new(s));
            true
        })
    }
}

impl<T: Clone> AccumulatorStore<T> {
    /// Clone of the current state
    pub fn snapshot(&self) -> AccumulatorState<T> {
        self.tx.borrow().clone()
    }
}
