// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagefeed
//!
//! Incremental accumulation of page-oriented HTTP APIs.
//!
//! Given an async "fetch one page" operation, a [`Session`] builds a growing,
//! de-duplicated list of records and decides when to ask for more: either
//! page by page (driven by explicit calls or by scroll position) or all at
//! once, fetching the remaining pages in parallel once the total is known.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagefeed::{HttpFetcherConfig, HttpPageFetcher, Session, SessionConfig};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> pagefeed::Result<()> {
//!     let fetcher = HttpPageFetcher::new(
//!         HttpFetcherConfig::builder("https://api.example.com").path("/posts").build(),
//!     )?;
//!     let session = Session::new(SessionConfig::<Value, Value>::json(fetcher).with_limit(50))?;
//!
//!     session.activate().await;
//!     while session.state().can_load_more() {
//!         session.load_next_page().await;
//!     }
//!
//!     println!("{} items", session.state().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Session                               │
//! │  activate()  load_next_page()  reset()  refresh()  scroll       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┴──────────┬───────────┬──────────┐
//! │  Fetch    │   Pager                     │  Store    │  Scroll  │
//! ├───────────┼─────────────────────────────┼───────────┼──────────┤
//! │ HTTP      │ Sequential                  │ Items     │ Viewport │
//! │ Closures  │ Concurrent bulk + dedup     │ Flags     │ Element  │
//! │ Rate limit│                             │ Generation│ Threshold│
//! └───────────┴─────────────────────────────┴───────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagefeed
pub mod error;

/// Common types and type aliases
pub mod types;

/// Page fetchers (HTTP and closures) with rate limiting
pub mod fetch;

/// Item and total-page extraction from responses
pub mod adapter;

/// Identity-keyed de-duplication
pub mod dedup;

/// Observable accumulator state
pub mod store;

/// Sequential and concurrent bulk pagers
pub mod pager;

/// Scroll sources and threshold trigger
pub mod scroll;

/// Session lifecycle
pub mod session;

/// Feed configuration files
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use adapter::{FnAdapter, HasMoreRule, JsonAdapter, ResponseAdapter};
pub use config::FeedConfig;
pub use dedup::{Deduplicator, Identity};
pub use fetch::{FnFetcher, HttpFetcherConfig, HttpPageFetcher, PageFetcher, RateLimiterConfig};
pub use pager::{PageOutcome, SessionStats};
pub use scroll::{ScrollMetrics, ScrollRegion, ScrollSource, ScrollTrigger};
pub use session::{Session, SessionConfig};
pub use store::AccumulatorState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
