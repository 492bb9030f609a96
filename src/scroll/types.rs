//! Scroll types and capability traits

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Position of a scrollable region, in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top
    pub scroll_top: f64,
    /// Full height of the content
    pub scroll_height: f64,
    /// Visible height of the region
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Create scroll metrics
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Fraction of the scrollable distance covered.
    ///
    /// Content that fits inside the region cannot scroll and counts as fully
    /// scrolled.
    pub fn scroll_percentage(&self) -> f64 {
        let scrollable = self.scroll_height - self.client_height;
        if scrollable <= 0.0 {
            return 1.0;
        }
        self.scroll_top / scrollable
    }
}

/// Callback invoked on every scroll event
pub type ScrollListener = Arc<dyn Fn(ScrollMetrics) + Send + Sync>;

/// A scrollable region that can be observed
pub trait ScrollSource: Send + Sync {
    /// Current scroll position
    fn metrics(&self) -> ScrollMetrics;

    /// Register `listener`; it stays attached until the subscription is dropped
    fn subscribe(&self, listener: ScrollListener) -> ScrollSubscription;
}

/// Whatever a scroll trigger drives
pub trait ScrollTarget: Send + Sync {
    /// Check if a fetch would currently be accepted
    fn can_load_more(&self) -> bool;

    /// Ask for the next page
    fn request_next_page(&self);
}

/// Handle to an attached listener. Dropping it detaches the listener.
pub struct ScrollSubscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ScrollSubscription {
    /// Create a subscription that runs `cancel` once when detached
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Subscription with nothing to detach
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Check if the listener is still attached
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Detach the listener now
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ScrollSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ScrollSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
