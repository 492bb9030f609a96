//! Adapter types and traits
//!
//! Defines how a raw response is turned into items and an optional total
//! page count, and how a session decides whether another page exists.

use crate::error::Result;
use std::sync::Arc;

/// Extracts the facts the engine needs from a raw response
pub trait ResponseAdapter<R, T>: Send + Sync {
    /// Items carried by this page, in API order
    fn extract_items(&self, response: &R) -> Result<Vec<T>>;

    /// Total number of pages, if the response reports one
    fn extract_total_pages(&self, response: &R) -> Option<u32>;
}

impl<R, T, A> ResponseAdapter<R, T> for Arc<A>
where
    A: ResponseAdapter<R, T> + ?Sized,
{
    fn extract_items(&self, response: &R) -> Result<Vec<T>> {
        (**self).extract_items(response)
    }

    fn extract_total_pages(&self, response: &R) -> Option<u32> {
        (**self).extract_total_pages(response)
    }
}

/// Caller predicate over the raw response and everything accumulated so far
pub type HasMoreFn<R, T> = Arc<dyn Fn(&R, &[T]) -> bool + Send + Sync>;

/// Decides whether a sequential session should ask for another page
///
/// Whatever the rule says, a page shorter than `limit` or a page at or past
/// the reported total always ends the session.
pub enum HasMoreRule<R, T> {
    /// Another page exists when this page came back full (`len == limit`)
    PageFull,
    /// Caller-supplied predicate
    Custom(HasMoreFn<R, T>),
}

impl<R, T> HasMoreRule<R, T> {
    /// Create a custom rule from a closure
    pub fn custom(f: impl Fn(&R, &[T]) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Evaluate the rule for a page that returned `page_len` items
    pub fn evaluate(&self, response: &R, page_len: usize, limit: u32, accumulated: &[T]) -> bool {
        match self {
            Self::PageFull => page_len == limit as usize,
            Self::Custom(f) => f(response, accumulated),
        }
    }
}

impl<R, T> Default for HasMoreRule<R, T> {
    fn default() -> Self {
        Self::PageFull
    }
}

impl<R, T> Clone for HasMoreRule<R, T> {
    fn clone(&self) -> Self {
        match self {
            Self::PageFull => Self::PageFull,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<R, T> std::fmt::Debug for HasMoreRule<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageFull => write!(f, "PageFull"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
