//! Scroll trigger module
//!
//! Turns scroll position changes into "load next page" requests.
//!
//! # Overview
//!
//! - `ScrollSource` - Anything that reports scroll metrics and accepts listeners
//! - `ScrollRegion` - In-process source for the viewport or a named element
//! - `ScrollTrigger` - Threshold check wired to a `ScrollTarget`
//! - `ScrollSubscription` - Listener handle, detached on drop

mod sources;
mod trigger;
mod types;

pub use sources::{RegionKind, ScrollRegion};
pub use trigger::ScrollTrigger;
pub use types::{ScrollListener, ScrollMetrics, ScrollSource, ScrollSubscription, ScrollTarget};
