//! Page fetcher trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::page::{Page, PageRequest};

/// Fetches one page of a server-held, ordered listing.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page described by `request`.
    async fn fetch_page(&self, request: PageRequest) -> Result<Page>;
}

#[async_trait]
impl<T> PageFetcher for Arc<T>
where
    T: PageFetcher + ?Sized,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<Page> {
        (**self).fetch_page(request).await
    }
}
