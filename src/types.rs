//! Common types used throughout pagefeed
//!
//! Shared type definitions and aliases used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// 1-based page number
pub type PageNumber = u32;

// ============================================================================
// Fetch Mode
// ============================================================================

/// Accumulation strategy used by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// One page at a time, usually driven by scrolling
    #[default]
    Sequential,
    /// Fetch page 1, then every remaining page in parallel
    Bulk,
}

impl FetchMode {
    /// Check if this is sequential mode
    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential)
    }

    /// Check if this is bulk mode
    pub fn is_bulk(&self) -> bool {
        matches!(self, Self::Bulk)
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Bulk => write!(f, "bulk"),
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Default page size
pub const DEFAULT_LIMIT: u32 = 20;

/// Default first page
pub const DEFAULT_INITIAL_PAGE: PageNumber = 1;

/// Default scroll threshold (fraction of scrollable distance)
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 0.8;

/// Default path to the item list in a JSON response
pub const DEFAULT_ITEMS_PATH: &str = "responseObject.items";

/// Default path to the total page count in a JSON response
pub const DEFAULT_TOTAL_PAGES_PATH: &str = "responseObject.totalPages";

/// Default identity field used for de-duplication
pub const DEFAULT_ID_FIELD: &str = "id";
