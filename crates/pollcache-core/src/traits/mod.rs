//! The capabilities a live collection is built from.

mod fetcher;
mod source;

pub use fetcher::PageFetcher;
pub use source::{EventHandler, EventSource, Subscription};
