//! pollcache-core - Core types and traits for live poll collections.

pub mod error;
pub mod events;
pub mod page;
pub mod traits;
pub mod types;

pub use error::Error;
pub use events::{EventKind, PollEvent, PollRef};
pub use page::{Direction, Filter, Page, PageOptions, PageRequest, Sort, SortField};
pub use traits::{EventHandler, EventSource, PageFetcher, Subscription};
pub use types::{Cursor, OptionId, PollId, PollVote, Scope, UserId, VoteId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
