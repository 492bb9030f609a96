//! Adapter implementations
//!
//! `JsonAdapter` walks dot paths in a JSON body; `FnAdapter` wraps closures
//! for typed responses.

use super::types::ResponseAdapter;
use crate::error::{Error, Result};
use crate::types::{DEFAULT_ITEMS_PATH, DEFAULT_TOTAL_PAGES_PATH};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// JSON Adapter
// ============================================================================

/// Extracts items and total pages from a JSON body using dot paths
///
/// Defaults to `responseObject.items` and `responseObject.totalPages`.
pub struct JsonAdapter<T = Value> {
    items_path: String,
    total_pages_path: Option<String>,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonAdapter<T> {
    /// Create an adapter with the default paths
    pub fn new() -> Self {
        Self::with_paths(DEFAULT_ITEMS_PATH, Some(DEFAULT_TOTAL_PAGES_PATH))
    }

    /// Create an adapter with custom paths
    pub fn with_paths(items_path: impl Into<String>, total_pages_path: Option<&str>) -> Self {
        Self {
            items_path: items_path.into(),
            total_pages_path: total_pages_path.map(ToString::to_string),
            _item: PhantomData,
        }
    }

    /// Path to the item list
    pub fn items_path(&self) -> &str {
        &self.items_path
    }

    /// Path to the total page count
    pub fn total_pages_path(&self) -> Option<&str> {
        self.total_pages_path.as_deref()
    }
}

impl<T> Default for JsonAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            items_path: self.items_path.clone(),
            total_pages_path: self.total_pages_path.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for JsonAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonAdapter")
            .field("items_path", &self.items_path)
            .field("total_pages_path", &self.total_pages_path)
            .finish()
    }
}

impl<T: DeserializeOwned> ResponseAdapter<Value, T> for JsonAdapter<T> {
    fn extract_items(&self, response: &Value) -> Result<Vec<T>> {
        match extract_path(response, &self.items_path) {
            // A missing or null list is an empty page
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    T::deserialize(item).map_err(|e| {
                        Error::decode(format!("Item {i} at '{}': {e}", self.items_path))
                    })
                })
                .collect(),
            Some(other) => Err(Error::decode(format!(
                "Expected an array at '{}', found {}",
                self.items_path,
                json_type(other)
            ))),
        }
    }

    fn extract_total_pages(&self, response: &Value) -> Option<u32> {
        let value = extract_path(response, self.total_pages_path.as_deref()?)?;
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ============================================================================
// Closure Adapter
// ============================================================================

type ItemsFn<R, T> = Arc<dyn Fn(&R) -> Result<Vec<T>> + Send + Sync>;
type TotalPagesFn<R> = Arc<dyn Fn(&R) -> Option<u32> + Send + Sync>;

/// Adapter built from closures, for typed responses
pub struct FnAdapter<R, T> {
    items: ItemsFn<R, T>,
    total_pages: Option<TotalPagesFn<R>>,
}

impl<R, T> FnAdapter<R, T> {
    /// Create an adapter from an item extractor
    pub fn new(items: impl Fn(&R) -> Result<Vec<T>> + Send + Sync + 'static) -> Self {
        Self {
            items: Arc::new(items),
            total_pages: None,
        }
    }

    /// Add a total page extractor
    #[must_use]
    pub fn with_total_pages(
        mut self,
        total_pages: impl Fn(&R) -> Option<u32> + Send + Sync + 'static,
    ) -> Self {
        self.total_pages = Some(Arc::new(total_pages));
        self
    }
}

impl<R, T> Clone for FnAdapter<R, T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            total_pages: self.total_pages.clone(),
        }
    }
}

impl<R, T> std::fmt::Debug for FnAdapter<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAdapter")
            .field("has_total_pages", &self.total_pages.is_some())
            .finish_non_exhaustive()
    }
}

impl<R, T> ResponseAdapter<R, T> for FnAdapter<R, T> {
    fn extract_items(&self, response: &R) -> Result<Vec<T>> {
        (self.items)(response)
    }

    fn extract_total_pages(&self, response: &R) -> Option<u32> {
        self.total_pages.as_ref().and_then(|f| f(response))
    }
}

// ============================================================================
// Path helpers
// ============================================================================

/// Resolve a dot path such as `$.data.items` or `pages[0].total`
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }
            let index: usize = index_str.parse().ok()?;
            current = current.get(index)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
