//! pollcache-memory - In-memory poll backend.
//!
//! Holds votes and answers for any number of polls, serves them page by page
//! through [`MemoryFetcher`], and publishes cast, changed, and removed events
//! to listeners registered through its [`EventSource`](pollcache_core::EventSource)
//! implementation.

mod fetcher;
mod listeners;
mod store;

pub use fetcher::{DEFAULT_LIMIT, MemoryFetcher};
pub use store::MemoryPollStore;
