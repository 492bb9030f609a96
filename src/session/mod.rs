//! Session module
//!
//! Ties the store, both pagers and the scroll trigger into one session with
//! a one-shot activation latch.
//!
//! # Example
//!
//! ```ignore
//! use pagefeed::{FnFetcher, Session, SessionConfig};
//! use serde_json::{json, Value};
//!
//! let fetcher = FnFetcher::new(|page: u32, limit: u32| async move {
//!     Ok(json!({"responseObject": {"items": [], "page": page, "limit": limit}}))
//! });
//! let session = Session::new(SessionConfig::<Value, Value>::json(fetcher))?;
//! session.activate().await;
//! println!("{} items", session.state().len());
//! ```

mod lifecycle;
mod types;

pub use lifecycle::Session;
pub use types::SessionConfig;

#[cfg(test)]
mod tests;
