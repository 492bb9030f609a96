//! CLI commands and argument parsing

use crate::types::FetchMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Incremental paged-API accumulator
#[derive(Parser, Debug)]
#[command(name = "pagefeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch pages until the API runs out and print every item
    Fetch(FetchArgs),

    /// Validate a feed configuration file
    Validate,
}

/// Arguments for `fetch`. Each one overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Base URL of the API
    #[arg(long)]
    pub url: Option<String>,

    /// Request path appended to the base URL
    #[arg(long)]
    pub path: Option<String>,

    /// Accumulation strategy
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Page size
    #[arg(long)]
    pub limit: Option<u32>,

    /// Stop after this many pages (sequential mode)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Extra request header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}

/// Accumulation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// One page at a time
    Sequential,
    /// First page, then the rest in parallel
    Bulk,
}

impl From<ModeArg> for FetchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sequential => Self::Sequential,
            ModeArg::Bulk => Self::Bulk,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
