//! Page fetcher trait and closure adapter
//!
//! A session treats the fetcher as a black box that may fail. Every call to
//! [`PageFetcher::fetch`] is a suspension point; nothing else in the engine
//! awaits.

use crate::error::Result;
use crate::types::PageNumber;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Fetches a single page of a paged API
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    /// Fetch page `page` (1-based) holding at most `limit` items
    async fn fetch(&self, page: PageNumber, limit: u32) -> Result<R>;
}

#[async_trait]
impl<R, P> PageFetcher<R> for Arc<P>
where
    P: PageFetcher<R> + ?Sized,
    R: Send + 'static,
{
    async fn fetch(&self, page: PageNumber, limit: u32) -> Result<R> {
        (**self).fetch(page, limit).await
    }
}

/// Wraps an async closure as a [`PageFetcher`]
///
/// ```rust,ignore
/// let fetcher = FnFetcher::new(|page, limit| async move {
///     api.list_items(page, limit).await.map_err(Error::from)
/// });
/// ```
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    /// Create a fetcher from a closure
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(PageNumber, u32) -> Fut,
    {
        Self { f }
    }
}

#[async_trait]
impl<R, F, Fut> PageFetcher<R> for FnFetcher<F>
where
    F: Fn(PageNumber, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R>> + Send,
    R: Send + 'static,
{
    async fn fetch(&self, page: PageNumber, limit: u32) -> Result<R> {
        (self.f)(page, limit).await
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}
