//! Session lifecycle
//!
//! Owns the one-shot activation latch and routes the outbound operations to
//! the configured pager.

use super::types::SessionConfig;
use crate::dedup::Deduplicator;
use crate::error::{Error, Result};
use crate::pager::{
    ConcurrentBulkPager, PageOutcome, PagerContext, SequentialPager, SessionStats, WriteMode,
};
use crate::scroll::{ScrollRegion, ScrollSource, ScrollTarget, ScrollTrigger};
use crate::store::{AccumulatorState, AccumulatorStore};
use crate::types::{FetchMode, PageNumber};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

struct SessionInner<R, T> {
    mode: FetchMode,
    initial_page: PageNumber,
    ctx: Arc<PagerContext<R, T>>,
    store: Arc<AccumulatorStore<T>>,
    sequential: SequentialPager<R, T>,
    bulk: ConcurrentBulkPager<R, T>,
    trigger: ScrollTrigger,
    viewport: ScrollRegion,
    activated: AtomicBool,
}

/// One accumulation session.
///
/// Cloning yields another handle to the same session. Scroll listeners are
/// detached when the last handle is dropped; in-flight fetches still resolve
/// but their results go nowhere.
pub struct Session<R, T> {
    inner: Arc<SessionInner<R, T>>,
}

impl<R, T> Clone for Session<R, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, T> Session<R, T>
where
    R: Send + 'static,
    T: Serialize + Clone + Send + Sync + 'static,
{
    /// Build a session from a validated config
    pub fn new(config: SessionConfig<R, T>) -> Result<Self> {
        config.validate()?;

        let SessionConfig {
            fetcher,
            adapter,
            limit,
            mode,
            scroll_threshold,
            has_more,
            initial_page,
            identity,
        } = config;

        let ctx = Arc::new(PagerContext::new(
            fetcher,
            adapter,
            limit,
            has_more,
            Deduplicator::new(identity),
        ));
        let store = Arc::new(AccumulatorStore::new(initial_page));

        debug!(%mode, limit, initial_page, scroll_threshold, "Session created");

        Ok(Self {
            inner: Arc::new(SessionInner {
                mode,
                initial_page,
                sequential: SequentialPager::new(Arc::clone(&ctx), Arc::clone(&store)),
                bulk: ConcurrentBulkPager::new(Arc::clone(&ctx), Arc::clone(&store)),
                ctx,
                store,
                trigger: ScrollTrigger::new(scroll_threshold)?,
                viewport: ScrollRegion::viewport(),
                activated: AtomicBool::new(false),
            }),
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Perform the initial fetch.
    ///
    /// Only the first call after construction or [`Self::reset`] fetches;
    /// later calls return [`PageOutcome::Skipped`].
    pub async fn activate(&self) -> PageOutcome {
        if self.inner.activated.swap(true, Ordering::AcqRel) {
            debug!("Session already activated");
            return PageOutcome::Skipped;
        }
        info!(mode = %self.inner.mode, "Activating session");

        match self.inner.mode {
            FetchMode::Sequential => self.inner.sequential.fetch_page(self.inner.initial_page).await,
            FetchMode::Bulk => self.inner.bulk.fetch_all().await,
        }
    }

    /// Check if the initial fetch has been issued
    pub fn is_activated(&self) -> bool {
        self.inner.activated.load(Ordering::Acquire)
    }

    /// Fetch the page after the cursor. Activates the session first if needed.
    pub async fn load_next_page(&self) -> PageOutcome {
        if !self.is_activated() {
            return self.activate().await;
        }

        match self.inner.mode {
            FetchMode::Sequential => {
                let page = self
                    .inner
                    .store
                    .with_state(|s| s.next_page(self.inner.initial_page));
                self.inner.sequential.fetch_page(page).await
            }
            FetchMode::Bulk => self.inner.bulk.fetch_all().await,
        }
    }

    /// Fetch every page at once, regardless of the configured mode
    pub async fn fetch_all(&self) -> PageOutcome {
        self.inner.activated.store(true, Ordering::Release);
        self.inner.bulk.fetch_all().await
    }

    /// Clear all accumulated state without fetching.
    ///
    /// The next [`Self::activate`] performs a fresh initial fetch. Fetches
    /// still in flight are discarded when they resolve.
    pub fn reset(&self) {
        self.inner.store.reset_all();
        self.inner.activated.store(false, Ordering::Release);
        info!("Session reset");
    }

    /// Clear all accumulated state and re-fetch the initial page (bulk mode:
    /// every page), replacing whatever was there.
    pub async fn refresh(&self) -> PageOutcome {
        let ticket = self.inner.store.begin_refresh();
        self.inner.activated.store(true, Ordering::Release);
        info!(generation = ticket.generation(), "Refreshing session");

        let outcome = match self.inner.mode {
            FetchMode::Sequential => {
                self.inner
                    .sequential
                    .run(ticket, self.inner.initial_page, WriteMode::Replace)
                    .await
            }
            FetchMode::Bulk => self.inner.bulk.run(ticket).await,
        };

        self.inner.store.end_refresh(&ticket);
        outcome
    }

    // ========================================================================
    // Scroll
    // ========================================================================

    /// Observe `container` for scroll events, or the session's viewport when
    /// `None`. Replaces any previously registered container.
    ///
    /// Must be called from within a tokio runtime; scroll-driven fetches are
    /// spawned onto it.
    pub fn register_scroll_container(&self, container: Option<Arc<dyn ScrollSource>>) -> Result<()> {
        let handle = Handle::try_current()
            .map_err(|e| Error::scroll(format!("no tokio runtime available: {}", e)))?;

        let target: Arc<dyn ScrollTarget> = Arc::new(SessionTarget {
            session: Arc::downgrade(&self.inner),
            handle,
        });

        match container {
            Some(source) => self.inner.trigger.attach(source.as_ref(), target),
            None => self.inner.trigger.attach(&self.inner.viewport, target),
        }
        Ok(())
    }

    /// Stop observing scroll events
    pub fn detach_scroll(&self) {
        self.inner.trigger.detach();
    }

    /// Check if a scroll container is being observed
    pub fn is_scroll_attached(&self) -> bool {
        self.inner.trigger.is_attached()
    }

    /// The session's viewport scroll source
    pub fn viewport(&self) -> &ScrollRegion {
        &self.inner.viewport
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Snapshot of the current state
    pub fn state(&self) -> AccumulatorState<T> {
        self.inner.store.snapshot()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<AccumulatorState<T>> {
        self.inner.store.subscribe()
    }

    /// Fetch statistics
    pub fn stats(&self) -> SessionStats {
        self.inner.ctx.stats()
    }

    /// Accumulation strategy
    pub fn mode(&self) -> FetchMode {
        self.inner.mode
    }

    /// Page size
    pub fn limit(&self) -> u32 {
        self.inner.ctx.limit
    }

    /// First page
    pub fn initial_page(&self) -> PageNumber {
        self.inner.initial_page
    }

    /// Scroll threshold
    pub fn scroll_threshold(&self) -> f64 {
        self.inner.trigger.threshold()
    }
}

impl<R, T> std::fmt::Debug for Session<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.inner.mode)
            .field("initial_page", &self.inner.initial_page)
            .field("activated", &self.inner.activated.load(Ordering::Relaxed))
            .field("trigger", &self.inner.trigger)
            .finish_non_exhaustive()
    }
}

/// Scroll target that loads the next page on the runtime it was registered on
struct SessionTarget<R, T> {
    session: Weak<SessionInner<R, T>>,
    handle: Handle,
}

impl<R, T> ScrollTarget for SessionTarget<R, T>
where
    R: Send + 'static,
    T: Serialize + Clone + Send + Sync + 'static,
{
    fn can_load_more(&self) -> bool {
        self.session.upgrade().is_some_and(|inner| {
            !inner.store.is_resetting() && inner.store.with_state(AccumulatorState::can_load_more)
        })
    }

    fn request_next_page(&self) {
        let Some(inner) = self.session.upgrade() else {
            return;
        };
        let session = Session { inner };
        self.handle.spawn(async move {
            let outcome = session.load_next_page().await;
            debug!(?outcome, "Scroll-triggered fetch finished");
        });
    }
}
