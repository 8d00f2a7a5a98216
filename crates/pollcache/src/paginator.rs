//! Cursor-driven backward pagination.
//!
//! The paginator does not perform I/O itself. [`CursorPaginator::begin`]
//! hands out the request for the next page and marks the paginator busy;
//! [`CursorPaginator::finish`] applies the fetch result. The collection
//! drives the fetch in between.

use std::sync::Arc;

use tracing::{debug, warn};

use pollcache_core::{Cursor, Error, Page, PageRequest, PollVote, Result, Scope};

use crate::config::CollectionConfig;
use crate::dedup;

/// Why a `load_more` call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A fetch is already in flight.
    Busy,
    /// The server reported no further pages.
    Exhausted,
    /// The collection has been torn down.
    Closed,
}

/// Result of one `load_more` call.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// A page was merged into the list.
    Loaded {
        /// Items appended after dropping ids the list already held.
        added: usize,
        /// Whether another page may follow.
        has_next_page: bool,
    },
    /// No fetch was made, or its result was discarded.
    Skipped(SkipReason),
    /// The fetch failed; the cursor and list are unchanged.
    Failed(Arc<Error>),
}

impl LoadOutcome {
    /// Returns true if a page was merged.
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Cursor, busy flag, and last error of one paginated listing.
#[derive(Debug, Default)]
pub struct CursorPaginator {
    cursor: Cursor,
    busy: bool,
    error: Option<Arc<Error>>,
}

impl CursorPaginator {
    /// Create a paginator that has not fetched anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Returns true while a fetch is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Returns the error of the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&Arc<Error>> {
        self.error.as_ref()
    }

    /// True until a page arrives without a `next` token.
    pub fn has_next_page(&self) -> bool {
        self.cursor.has_next_page()
    }

    /// Start a fetch: returns the request to send and marks the paginator busy.
    ///
    /// # Errors
    ///
    /// Returns the reason to skip when the listing is exhausted or a fetch is
    /// already in flight. Nothing changes in that case.
    pub fn begin(
        &mut self,
        scope: &Scope,
        config: &CollectionConfig,
    ) -> std::result::Result<PageRequest, SkipReason> {
        if !self.cursor.has_next_page() {
            return Err(SkipReason::Exhausted);
        }
        if self.busy {
            return Err(SkipReason::Busy);
        }

        self.busy = true;
        Ok(config.page_request(scope, &self.cursor))
    }

    /// Apply the result of the fetch started by [`CursorPaginator::begin`].
    ///
    /// On success the page is appended to `items` without duplicating ids,
    /// the cursor advances, and any previous error is cleared. On failure the
    /// error is kept and both the cursor and `items` are left untouched, so
    /// the next call retries the same page.
    pub fn finish(&mut self, result: Result<Page>, items: &mut Vec<PollVote>) -> LoadOutcome {
        self.busy = false;

        match result {
            Ok(page) => {
                let fetched = page.items.len();
                let added = dedup::append_unique(items, page.items);
                self.cursor = Cursor::from_page_next(page.next);
                self.error = None;

                debug!(
                    fetched,
                    added,
                    has_next_page = self.has_next_page(),
                    "Merged page"
                );

                LoadOutcome::Loaded {
                    added,
                    has_next_page: self.has_next_page(),
                }
            }
            Err(err) => {
                warn!(error = %err, retryable = err.is_retryable(), "Page fetch failed");
                let err = Arc::new(err);
                self.error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Clear the busy flag of a fetch whose result will never arrive.
    pub fn abandon(&mut self) {
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pollcache_core::error::FetchError;
    use pollcache_core::{OptionId, PollId, VoteId};

    fn scope() -> Scope {
        Scope::OptionVotes {
            poll_id: PollId::new("p1").unwrap(),
            option_id: OptionId::new("optA").unwrap(),
        }
    }

    fn vote(id: &str) -> PollVote {
        PollVote::vote(
            VoteId::new(id).unwrap(),
            OptionId::new("optA").unwrap(),
            Utc::now(),
        )
    }

    fn page(ids: &[&str], next: Option<&str>) -> Page {
        Page {
            items: ids.iter().map(|id| vote(id)).collect(),
            next: next.map(str::to_string),
        }
    }

    #[test]
    fn begin_marks_busy_and_guards_reentry() {
        let mut paginator = CursorPaginator::new();
        let config = CollectionConfig::default();

        assert!(paginator.begin(&scope(), &config).is_ok());
        assert!(paginator.is_busy());
        assert_eq!(paginator.begin(&scope(), &config), Err(SkipReason::Busy));
    }

    #[test]
    fn success_advances_cursor_and_appends() {
        let mut paginator = CursorPaginator::new();
        let mut items = vec![vote("a")];
        paginator.begin(&scope(), &CollectionConfig::default()).unwrap();

        let outcome = paginator.finish(Ok(page(&["a", "b"], Some("c2"))), &mut items);

        assert!(matches!(
            outcome,
            LoadOutcome::Loaded {
                added: 1,
                has_next_page: true
            }
        ));
        assert_eq!(paginator.cursor(), &Cursor::Next("c2".to_string()));
        assert!(!paginator.is_busy());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn failure_keeps_cursor_and_items() {
        let mut paginator = CursorPaginator::new();
        let config = CollectionConfig::default();
        let mut items = Vec::new();

        paginator.begin(&scope(), &config).unwrap();
        paginator.finish(Ok(page(&["a"], Some("c1"))), &mut items);

        let request = paginator.begin(&scope(), &config).unwrap();
        assert_eq!(request.options.next.as_deref(), Some("c1"));
        let outcome = paginator.finish(Err(FetchError::transport("offline").into()), &mut items);

        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert!(paginator.error().is_some());
        assert!(!paginator.is_busy());
        assert_eq!(paginator.cursor(), &Cursor::Next("c1".to_string()));
        assert_eq!(items.len(), 1);

        // The retry resumes from the same cursor and clears the error.
        let retry = paginator.begin(&scope(), &config).unwrap();
        assert_eq!(retry.options.next.as_deref(), Some("c1"));
        paginator.finish(Ok(page(&["b"], None)), &mut items);
        assert!(paginator.error().is_none());
    }

    #[test]
    fn exhausted_skips() {
        let mut paginator = CursorPaginator::new();
        let config = CollectionConfig::default();
        let mut items = Vec::new();

        paginator.begin(&scope(), &config).unwrap();
        paginator.finish(Ok(page(&["a"], None)), &mut items);

        assert!(!paginator.has_next_page());
        assert_eq!(paginator.begin(&scope(), &config), Err(SkipReason::Exhausted));
        assert!(!paginator.is_busy());
    }
}
