//! pollcache - Live paginated poll vote and answer collections.
//!
//! A [`LiveCollection`] keeps one client-side list per scope (a poll's
//! answers, or the votes for one option). Older pages are pulled on demand
//! through a [`PageFetcher`](pollcache_core::PageFetcher), while cast,
//! changed, and removed events from an [`EventSource`](pollcache_core::EventSource)
//! are applied as they arrive. Both paths merge by id, so the list never
//! holds duplicates no matter how fetches and events interleave.

pub mod collection;
pub mod config;
pub mod dedup;
pub mod paginator;
pub mod reconciler;

pub use collection::{CollectionSnapshot, LiveCollection};
pub use config::{CollectionConfig, DEFAULT_PAGE_SIZE};
pub use dedup::Identified;
pub use paginator::{CursorPaginator, LoadOutcome, SkipReason};
pub use reconciler::{EventReconciler, IgnoreReason, Reconciled};

pub use pollcache_core::{Error, Result};
