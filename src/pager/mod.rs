//! Pager module
//!
//! The two accumulation strategies.
//!
//! # Overview
//!
//! - `SequentialPager` - Fetch one page at a time, append, decide continuation
//! - `ConcurrentBulkPager` - Fetch page 1, then all remaining pages in parallel
//! - `PagerContext` - Fetcher, adapter, limit, continuation rule, dedup, stats
//! - `PageOutcome` - What a single call did

mod bulk;
mod sequential;
mod types;

pub use bulk::ConcurrentBulkPager;
pub use sequential::SequentialPager;
pub use types::{PageOutcome, PagerContext, SessionStats, WriteMode};
