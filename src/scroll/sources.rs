//! In-process scroll sources

use super::types::{ScrollListener, ScrollMetrics, ScrollSource, ScrollSubscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Which region a [`ScrollRegion`] stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    /// The global viewport
    Viewport,
    /// An explicitly registered element
    Element(String),
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewport => write!(f, "viewport"),
            Self::Element(id) => write!(f, "element '{}'", id),
        }
    }
}

struct RegionInner {
    kind: RegionKind,
    metrics: Mutex<ScrollMetrics>,
    listeners: Mutex<Vec<(u64, ScrollListener)>>,
    next_id: AtomicU64,
}

/// Scroll source fed by the host through [`ScrollRegion::emit`].
///
/// Cloning yields another handle to the same region.
#[derive(Clone)]
pub struct ScrollRegion {
    inner: Arc<RegionInner>,
}

impl ScrollRegion {
    fn with_kind(kind: RegionKind) -> Self {
        Self {
            inner: Arc::new(RegionInner {
                kind,
                metrics: Mutex::new(ScrollMetrics::default()),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// The global viewport
    pub fn viewport() -> Self {
        Self::with_kind(RegionKind::Viewport)
    }

    /// A custom scroll container
    pub fn element(id: impl Into<String>) -> Self {
        Self::with_kind(RegionKind::Element(id.into()))
    }

    /// Region kind
    pub fn kind(&self) -> &RegionKind {
        &self.inner.kind
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Record a scroll event and notify every listener
    pub fn emit(&self, metrics: ScrollMetrics) {
        *self
            .inner
            .metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = metrics;

        // Listeners run outside the lock so they may subscribe or detach
        let listeners: Vec<ScrollListener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!(
            region = %self.inner.kind,
            listeners = listeners.len(),
            percentage = metrics.scroll_percentage(),
            "Scroll event"
        );
        for listener in listeners {
            listener(metrics);
        }
    }
}

impl ScrollSource for ScrollRegion {
    fn metrics(&self) -> ScrollMetrics {
        *self
            .inner
            .metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, listener: ScrollListener) -> ScrollSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        let region = Arc::downgrade(&self.inner);
        ScrollSubscription::new(move || {
            if let Some(region) = region.upgrade() {
                region
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(existing, _)| *existing != id);
            }
        })
    }
}

impl std::fmt::Debug for ScrollRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRegion")
            .field("kind", &self.inner.kind)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
