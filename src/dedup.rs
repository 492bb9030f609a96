//! Identity-keyed de-duplication
//!
//! Bulk mode fetches pages independently, so a misbehaving API can return
//! the same record twice. Items are keyed by their `id` field when the
//! serialized item is an object that has one, otherwise by their compact
//! JSON serialization. First-seen wins. Items that cannot be serialized
//! have no key and are always kept.

use crate::types::DEFAULT_ID_FIELD;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Custom identity function
pub type IdentityFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// How an item's identity key is computed
pub enum Identity<T> {
    /// Use the named field of the serialized item, falling back to its JSON
    Field(String),
    /// Caller-supplied key function
    Custom(IdentityFn<T>),
}

impl<T> Identity<T> {
    /// Key items by a custom function
    pub fn custom(f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Key items by the given field name
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Self::Field(DEFAULT_ID_FIELD.to_string())
    }
}

impl<T> Clone for Identity<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(name) => Self::Field(name.clone()),
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for Identity<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Merges item lists, dropping items whose identity key was already seen
#[derive(Debug, Clone)]
pub struct Deduplicator<T> {
    identity: Identity<T>,
}

impl<T: Serialize> Deduplicator<T> {
    /// Create a deduplicator with the given identity
    pub fn new(identity: Identity<T>) -> Self {
        Self { identity }
    }

    /// Identity key for a single item, `None` when it cannot be serialized
    pub fn identity_key(&self, item: &T) -> Option<String> {
        match &self.identity {
            Identity::Custom(f) => Some(f(item)),
            Identity::Field(field) => field_identity_key(item, field),
        }
    }

    /// Merge lists in the given order, keeping the first occurrence of each key.
    ///
    /// Returns the merged list and the number of dropped duplicates.
    pub fn merge<I>(&self, lists: I) -> (Vec<T>, usize)
    where
        I: IntoIterator<Item = Vec<T>>,
    {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut dropped = 0;

        for list in lists {
            for item in list {
                match self.identity_key(&item) {
                    // Items without a key are always kept
                    None => merged.push(item),
                    Some(key) if seen.insert(key.clone()) => merged.push(item),
                    Some(_) => dropped += 1,
                }
            }
        }

        (merged, dropped)
    }
}

impl<T: Serialize> Default for Deduplicator<T> {
    fn default() -> Self {
        Self::new(Identity::default())
    }
}

/// Key an item by `field` when present, else by its JSON text
fn field_identity_key<T: Serialize>(item: &T, field: &str) -> Option<String> {
    let value = serde_json::to_value(item).ok()?;

    Some(match value.get(field) {
        Some(Value::Null) | None => format!("json:{value}"),
        Some(id) => format!("id:{id}"),
    })
}
