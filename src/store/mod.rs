//! Accumulator store module
//!
//! Holds the authoritative session state: accumulated items, page cursor,
//! loading flags, exhaustion flag and last error.
//!
//! # Overview
//!
//! - `AccumulatorState` - The observable state
//! - `AccumulatorStore` - The only mutator, publishing over a watch channel
//! - `StateWriter` - Narrow setters handed to pagers on commit
//! - `FetchTicket` - Generation stamp captured when a fetch starts

mod accumulator;
mod types;

pub use accumulator::{AccumulatorStore, StateWriter};
pub use types::{AccumulatorState, FetchTicket};
