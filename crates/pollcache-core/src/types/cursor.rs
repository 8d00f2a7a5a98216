//! Pagination cursor state.

use serde::{Deserialize, Serialize};

/// Where a backward paginated listing stands.
///
/// `Unstarted` and `Exhausted` both mean "no resume token", but only one of
/// them still has pages to offer, so the two are never folded into a bool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "next", rename_all = "snake_case")]
pub enum Cursor {
    /// No page has been fetched yet.
    #[default]
    Unstarted,

    /// More pages may exist; resume from this opaque token.
    Next(String),

    /// The server reported no further pages.
    Exhausted,
}

impl Cursor {
    /// Map the `next` value of a fetched page onto a cursor.
    ///
    /// An absent or empty token means the listing is exhausted.
    pub fn from_page_next(next: Option<String>) -> Self {
        match next {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Exhausted,
        }
    }

    /// Returns the resume token, if any.
    pub fn as_next(&self) -> Option<&str> {
        match self {
            Cursor::Next(token) => Some(token),
            Cursor::Unstarted | Cursor::Exhausted => None,
        }
    }

    /// True until the server reports the end of the listing.
    pub fn has_next_page(&self) -> bool {
        !matches!(self, Cursor::Exhausted)
    }

    /// Returns true if no page has been fetched yet.
    pub fn is_unstarted(&self) -> bool {
        matches!(self, Cursor::Unstarted)
    }
}
