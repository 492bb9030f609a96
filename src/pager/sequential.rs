//! Sequential pager
//!
//! Fetches one page at a time and appends it. The store's guard serializes
//! calls, so pages are requested and appended in strictly increasing order.

use super::types::{PageOutcome, PagerContext, WriteMode};
use crate::error::Result;
use crate::store::{AccumulatorStore, FetchTicket};
use crate::types::PageNumber;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One-page-at-a-time accumulation strategy
pub struct SequentialPager<R, T> {
    ctx: Arc<PagerContext<R, T>>,
    store: Arc<AccumulatorStore<T>>,
}

impl<R, T> Clone for SequentialPager<R, T> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            store: Arc::clone(&self.store),
        }
    }
}

impl<R, T> SequentialPager<R, T>
where
    R: Send + 'static,
    T: Send + Sync + 'static,
{
    /// Create a pager writing into `store`
    pub fn new(ctx: Arc<PagerContext<R, T>>, store: Arc<AccumulatorStore<T>>) -> Self {
        Self { ctx, store }
    }

    /// Fetch `page` and append it.
    ///
    /// A no-op while another fetch is in flight, after exhaustion, or during
    /// a reset.
    pub async fn fetch_page(&self, page: PageNumber) -> PageOutcome {
        let Some(ticket) = self.store.try_begin_fetch(true) else {
            debug!(page, "Skipping fetch: busy, exhausted or resetting");
            return PageOutcome::Skipped;
        };
        self.run(ticket, page, WriteMode::Append).await
    }

    /// Fetch `page` under an already-admitted ticket
    pub async fn run(&self, ticket: FetchTicket, page: PageNumber, mode: WriteMode) -> PageOutcome {
        let start = Instant::now();
        let limit = self.ctx.limit;
        let initial_page = self.store.initial_page();
        debug!(page, limit, ?mode, "Fetching page");

        let result = self.fetch_and_extract(page).await;
        let elapsed = start.elapsed();

        let mut outcome = PageOutcome::Discarded;
        let applied = match result {
            Ok((response, items, total_pages)) => {
                let count = items.len();
                self.store.commit(&ticket, |w| {
                    if items.is_empty() {
                        w.set_has_more(false);
                        outcome = PageOutcome::Exhausted;
                    } else {
                        match mode {
                            WriteMode::Append => w.append(items),
                            WriteMode::Replace => w.replace(items),
                        }

                        // Total page counts are relative to the initial page
                        let ordinal = page.saturating_sub(initial_page).saturating_add(1);
                        let has_more = count >= limit as usize
                            && total_pages.map_or(true, |total| ordinal < total)
                            && self.ctx.has_more.evaluate(&response, count, limit, w.items());

                        w.set_has_more(has_more);
                        w.set_last_loaded_page(page);
                        if has_more {
                            w.set_page(page);
                        }
                        outcome = PageOutcome::Loaded {
                            page,
                            items: count,
                            has_more,
                        };
                    }
                    w.set_loading(false);
                    w.finish_initial_load();
                })
            }
            Err(e) => {
                let message = e.user_message();
                warn!(page, error = %e, "Page fetch failed");
                self.store.commit(&ticket, |w| {
                    w.set_error(message.clone());
                    w.set_loading(false);
                    w.finish_initial_load();
                    outcome = PageOutcome::Failed(message);
                })
            }
        };

        self.ctx.record(|stats| {
            stats.set_last_fetch(elapsed);
            match &outcome {
                PageOutcome::Loaded { items, .. } => stats.add_page(*items),
                PageOutcome::Exhausted => stats.add_page(0),
                PageOutcome::Failed(_) => stats.add_error(),
                PageOutcome::Discarded => stats.add_stale(),
                PageOutcome::Skipped => {}
            }
        });

        if applied {
            debug!(page, ?outcome, elapsed_ms = elapsed.as_millis() as u64, "Page applied");
        } else {
            debug!(
                page,
                generation = ticket.generation(),
                "Discarding result from superseded generation"
            );
        }
        outcome
    }

    async fn fetch_and_extract(&self, page: PageNumber) -> Result<(R, Vec<T>, Option<u32>)> {
        let response = self.ctx.fetcher.fetch(page, self.ctx.limit).await?;
        let items = self.ctx.adapter.extract_items(&response)?;
        let total_pages = self.ctx.adapter.extract_total_pages(&response);
        Ok((response, items, total_pages))
    }
}

impl<R, T> std::fmt::Debug for SequentialPager<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialPager")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
