//! Core pollcache types.
//!
//! Identifiers enforce their format at construction time, so a collection
//! never has to re-validate what it stores.

mod cursor;
mod id;
mod scope;
mod vote;

pub use cursor::Cursor;
pub use id::{MAX_ID_LEN, OptionId, PollId, UserId, VoteId};
pub use scope::Scope;
pub use vote::PollVote;
