//! Concurrent bulk pager
//!
//! Fetches the first page, learns the total page count, then requests every
//! remaining page at once. Results are merged in page-number order, not
//! completion order, with identity-keyed de-duplication. All-or-nothing: one
//! failed page discards the whole round.

use super::types::{PageOutcome, PagerContext};
use crate::error::Result;
use crate::store::{AccumulatorStore, FetchTicket};
use crate::types::PageNumber;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetch-everything-now accumulation strategy
pub struct ConcurrentBulkPager<R, T> {
    ctx: Arc<PagerContext<R, T>>,
    store: Arc<AccumulatorStore<T>>,
}

impl<R, T> Clone for ConcurrentBulkPager<R, T> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            store: Arc::clone(&self.store),
        }
    }
}

/// Result of a successful round, before it is committed
struct BulkRound<T> {
    items: Vec<T>,
    last_page: PageNumber,
    pages: usize,
    received: usize,
    duplicates: usize,
}

impl<R, T> ConcurrentBulkPager<R, T>
where
    R: Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    /// Create a pager writing into `store`
    pub fn new(ctx: Arc<PagerContext<R, T>>, store: Arc<AccumulatorStore<T>>) -> Self {
        Self { ctx, store }
    }

    /// Fetch every page and replace the accumulated list with the result
    pub async fn fetch_all(&self) -> PageOutcome {
        let Some(ticket) = self.store.try_begin_fetch(true) else {
            debug!("Skipping bulk fetch: busy, exhausted or resetting");
            return PageOutcome::Skipped;
        };
        self.run(ticket).await
    }

    /// Run a bulk round under an already-admitted ticket
    pub async fn run(&self, ticket: FetchTicket) -> PageOutcome {
        let start = Instant::now();
        let first_page = self.store.initial_page();

        let result = self.collect(first_page).await;
        let elapsed = start.elapsed();

        let mut outcome = PageOutcome::Discarded;
        let mut round_stats = None;
        let applied = match result {
            Ok(None) => self.store.commit(&ticket, |w| {
                w.set_has_more(false);
                w.set_loading(false);
                w.finish_initial_load();
                outcome = PageOutcome::Exhausted;
            }),
            Ok(Some(round)) => {
                let BulkRound {
                    items,
                    last_page,
                    pages,
                    received,
                    duplicates,
                } = round;
                let count = items.len();
                round_stats = Some((pages, received, duplicates));
                self.store.commit(&ticket, |w| {
                    w.replace(items);
                    w.set_page(last_page);
                    w.set_last_loaded_page(last_page);
                    w.set_has_more(false);
                    w.set_loading(false);
                    w.finish_initial_load();
                    outcome = PageOutcome::Loaded {
                        page: last_page,
                        items: count,
                        has_more: false,
                    };
                })
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Bulk fetch failed, discarding partial results");
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
                PageOutcome::Loaded { .. } => {
                    if let Some((pages, received, duplicates)) = round_stats {
                        stats.pages_fetched += pages;
                        stats.items_received += received;
                        stats.add_duplicates(duplicates);
                    }
                }
                PageOutcome::Exhausted => stats.add_page(0),
                PageOutcome::Failed(_) => stats.add_error(),
                PageOutcome::Discarded => stats.add_stale(),
                PageOutcome::Skipped => {}
            }
        });

        if applied {
            info!(?outcome, elapsed_ms = elapsed.as_millis() as u64, "Bulk fetch complete");
        } else {
            debug!(
                generation = ticket.generation(),
                "Discarding bulk result from superseded generation"
            );
        }
        outcome
    }

    /// Fetch and merge every page. `Ok(None)` means the first page was empty.
    async fn collect(&self, first_page: PageNumber) -> Result<Option<BulkRound<T>>> {
        let limit = self.ctx.limit;

        let response = self.ctx.fetcher.fetch(first_page, limit).await?;
        let first_items = self.ctx.adapter.extract_items(&response)?;
        if first_items.is_empty() {
            return Ok(None);
        }

        let total_pages = self.ctx.adapter.extract_total_pages(&response).unwrap_or(1);
        let received = first_items.len();
        if total_pages <= 1 {
            return Ok(Some(BulkRound {
                items: first_items,
                last_page: first_page,
                pages: 1,
                received,
                duplicates: 0,
            }));
        }

        let last_page = first_page.saturating_add(total_pages - 1);
        debug!(
            total_pages,
            remaining = total_pages - 1,
            "Fetching remaining pages concurrently"
        );

        // join_all yields results in request order regardless of completion order
        let responses = join_all(((first_page + 1)..=last_page).map(|page| {
            let fetcher = Arc::clone(&self.ctx.fetcher);
            async move { (page, fetcher.fetch(page, limit).await) }
        }))
        .await;

        let mut lists = Vec::with_capacity(responses.len() + 1);
        lists.push(first_items);
        let mut received = received;
        for (page, response) in responses {
            let response = response.map_err(|e| {
                warn!(page, error = %e, "Bulk page failed");
                e
            })?;
            let items = self.ctx.adapter.extract_items(&response)?;
            received += items.len();
            lists.push(items);
        }

        let pages = lists.len();
        let (items, duplicates) = self.ctx.dedup.merge(lists);
        if duplicates > 0 {
            debug!(duplicates, "Dropped duplicate items across pages");
        }

        Ok(Some(BulkRound {
            items,
            last_page,
            pages,
            received,
            duplicates,
        }))
    }
}

impl<R, T> std::fmt::Debug for ConcurrentBulkPager<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentBulkPager")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
