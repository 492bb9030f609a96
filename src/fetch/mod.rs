//! Page fetching module
//!
//! The engine only needs "fetch page N of size M". This module defines that
//! boundary and ships two implementations.
//!
//! # Overview
//!
//! - `PageFetcher` - The async fetch contract
//! - `FnFetcher` - Adapts an async closure
//! - `HttpPageFetcher` - reqwest GET with page/limit query parameters
//! - `RateLimiter` - Token bucket throttling using governor

mod client;
mod rate_limit;
mod types;

pub use client::{HttpFetcherConfig, HttpFetcherConfigBuilder, HttpPageFetcher};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::{FnFetcher, PageFetcher};

#[cfg(test)]
mod tests;
