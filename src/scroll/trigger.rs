//! Threshold-based scroll trigger

use super::types::{ScrollMetrics, ScrollSource, ScrollSubscription, ScrollTarget};
use crate::error::{Error, Result};
use crate::types::DEFAULT_SCROLL_THRESHOLD;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Calls a target's "load next" once the scroll position crosses a threshold.
///
/// At most one source is observed at a time. No debounce is applied; the
/// target's own re-entrancy guard collapses bursts of events.
#[derive(Debug)]
pub struct ScrollTrigger {
    threshold: f64,
    subscription: Mutex<Option<ScrollSubscription>>,
}

impl ScrollTrigger {
    /// Create a trigger. `threshold` must lie strictly between 0 and 1.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Error::invalid_value(
                "scroll_threshold",
                format!("must be between 0 and 1 (exclusive), got {}", threshold),
            ));
        }
        Ok(Self {
            threshold,
            subscription: Mutex::new(None),
        })
    }

    /// Configured threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check if `metrics` is far enough down to ask for more
    pub fn is_past_threshold(&self, metrics: &ScrollMetrics) -> bool {
        metrics.scroll_percentage() >= self.threshold
    }

    /// Observe `source`, replacing any previously observed one
    pub fn attach(&self, source: &dyn ScrollSource, target: Arc<dyn ScrollTarget>) {
        let mut slot = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(mut previous) = slot.take() {
            previous.cancel();
            debug!("Detached previous scroll listener");
        }

        let threshold = self.threshold;
        let subscription = source.subscribe(Arc::new(move |metrics: ScrollMetrics| {
            if metrics.scroll_percentage() >= threshold && target.can_load_more() {
                target.request_next_page();
            }
        }));
        *slot = Some(subscription);
        debug!(threshold, "Attached scroll listener");
    }

    /// Stop observing the current source, if any
    pub fn detach(&self) {
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!("Detached scroll listener");
        }
    }

    /// Check if a source is being observed
    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(ScrollSubscription::is_active)
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SCROLL_THRESHOLD,
            subscription: Mutex::new(None),
        }
    }
}
