//! Response adapter module
//!
//! Turns a raw page response into `items` plus an optional `total_pages`.
//!
//! # Overview
//!
//! - `ResponseAdapter` - Extraction contract
//! - `JsonAdapter` - Dot-path extraction over `serde_json::Value`
//! - `FnAdapter` - Closures for typed responses
//! - `HasMoreRule` - Continuation predicate for sequential mode

mod extractors;
mod types;

pub use extractors::{extract_path, FnAdapter, JsonAdapter};
pub use types::{HasMoreFn, HasMoreRule, ResponseAdapter};
