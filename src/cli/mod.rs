//! CLI module
//!
//! Command-line interface for accumulating paged APIs.
//!
//! # Commands
//!
//! - `fetch` - Run a session to exhaustion and print the items
//! - `validate` - Check a feed configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, FetchArgs, ModeArg, OutputFormat};
pub use runner::Runner;
