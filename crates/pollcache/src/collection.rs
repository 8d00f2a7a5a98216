//! Live collection: one materialized list fed by pagination and live events.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pollcache::{CollectionConfig, LiveCollection};
//! use pollcache_core::{EventSource, OptionId, PageFetcher, PollId};
//!
//! # async fn example(
//! #     fetcher: Arc<dyn PageFetcher>,
//! #     events: Arc<dyn EventSource>,
//! # ) -> Result<(), pollcache_core::Error> {
//! let votes = LiveCollection::option_votes(
//!     PollId::new("poll-1")?,
//!     OptionId::new("option-a")?,
//!     fetcher,
//!     events,
//!     CollectionConfig::default(),
//! );
//!
//! votes.activate().await;
//! for vote in votes.items() {
//!     println!("{} at {}", vote.id, vote.created_at);
//! }
//! if votes.has_next_page() {
//!     votes.load_more().await;
//! }
//! votes.close();
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, instrument, trace};

use pollcache_core::{
    Error, EventKind, EventSource, OptionId, PageFetcher, PollEvent, PollId, PollVote, Scope,
    Subscription,
};

use crate::config::CollectionConfig;
use crate::paginator::{CursorPaginator, LoadOutcome, SkipReason};
use crate::reconciler::EventReconciler;

/// A point-in-time copy of a collection's read model.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot {
    /// The materialized list, unique by id.
    pub items: Vec<PollVote>,
    /// True while a page fetch is in flight.
    pub loading: bool,
    /// The last fetch error, cleared by the next successful fetch.
    pub error: Option<Arc<Error>>,
    /// False once the server reported the last page, or after close.
    pub has_next_page: bool,
}

/// A lazily paginated list of votes or answers that stays current with live events.
///
/// Handles are cheap to clone and share one underlying state. The collection
/// is inert until [`LiveCollection::activate`] registers its event listeners;
/// [`LiveCollection::close`] is the terminal teardown. Dropping the last
/// handle releases the listeners as well.
#[derive(Clone)]
pub struct LiveCollection {
    inner: Arc<Inner>,
}

struct Inner {
    reconciler: EventReconciler,
    config: CollectionConfig,
    fetcher: Arc<dyn PageFetcher>,
    events: Arc<dyn EventSource>,
    state: Mutex<State>,
    revision: watch::Sender<u64>,
}

#[derive(Default)]
struct State {
    items: Vec<PollVote>,
    paginator: CursorPaginator,
    subscriptions: Vec<Subscription>,
    first_activation_done: bool,
    closed: bool,
}

impl LiveCollection {
    /// Create a collection for `scope`. Nothing is fetched or subscribed yet.
    pub fn new(
        scope: Scope,
        fetcher: Arc<dyn PageFetcher>,
        events: Arc<dyn EventSource>,
        config: CollectionConfig,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                reconciler: EventReconciler::new(scope),
                config,
                fetcher,
                events,
                state: Mutex::new(State::default()),
                revision,
            }),
        }
    }

    /// Create a collection of all answers to `poll_id`.
    pub fn answers(
        poll_id: PollId,
        fetcher: Arc<dyn PageFetcher>,
        events: Arc<dyn EventSource>,
        config: CollectionConfig,
    ) -> Self {
        Self::new(Scope::Answers { poll_id }, fetcher, events, config)
    }

    /// Create a collection of the votes cast for `option_id` of `poll_id`.
    pub fn option_votes(
        poll_id: PollId,
        option_id: OptionId,
        fetcher: Arc<dyn PageFetcher>,
        events: Arc<dyn EventSource>,
        config: CollectionConfig,
    ) -> Self {
        Self::new(
            Scope::OptionVotes { poll_id, option_id },
            fetcher,
            events,
            config,
        )
    }

    /// Returns the scope this collection tracks.
    pub fn scope(&self) -> &Scope {
        self.inner.reconciler.scope()
    }

    /// Register the event listeners and, on the first activation of an empty
    /// collection with `load_first_page` set, fetch the first page.
    ///
    /// Activating an already active collection keeps its listeners. The
    /// automatic first page is attempted at most once per collection.
    #[instrument(skip(self), fields(scope = %self.scope()))]
    pub async fn activate(&self) {
        let needs_listeners = {
            let state = self.inner.lock();
            if state.closed {
                debug!("Ignoring activation of closed collection");
                return;
            }
            state.subscriptions.is_empty()
        };

        if needs_listeners {
            let fresh = self.subscribe();
            let surplus = {
                let mut state = self.inner.lock();
                if state.closed || !state.subscriptions.is_empty() {
                    fresh
                } else {
                    debug!(listeners = fresh.len(), "Subscribed to poll events");
                    state.subscriptions = fresh;
                    Vec::new()
                }
            };
            drop(surplus);
        }

        let auto_load = {
            let mut state = self.inner.lock();
            let first = !mem::replace(&mut state.first_activation_done, true);
            first && self.inner.config.load_first_page && state.items.is_empty()
        };

        if auto_load {
            debug!("Loading first page");
            self.load_more().await;
        }
    }

    /// Release the event listeners. The list is kept and the collection can
    /// be activated again.
    pub fn deactivate(&self) {
        let released = mem::take(&mut self.inner.lock().subscriptions);
        if !released.is_empty() {
            debug!(scope = %self.scope(), listeners = released.len(), "Released poll event listeners");
        }
    }

    /// Tear the collection down: release listeners and discard all state.
    ///
    /// A fetch still in flight is allowed to settle, but its page is dropped.
    /// Closing twice is a no-op.
    pub fn close(&self) {
        let released = {
            let mut state = self.inner.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.items.clear();
            state.paginator = CursorPaginator::new();
            mem::take(&mut state.subscriptions)
        };
        drop(released);

        debug!(scope = %self.scope(), "Closed collection");
        self.inner.bump();
    }

    /// Fetch the next older page and merge it into the list.
    ///
    /// Does nothing when the listing is exhausted, a fetch is already in
    /// flight, or the collection is closed. Failures are reported through
    /// [`LiveCollection::error`] and leave the cursor in place for a retry.
    #[instrument(skip(self), fields(scope = %self.scope()))]
    pub async fn load_more(&self) -> LoadOutcome {
        let request = {
            let mut state = self.inner.lock();
            if state.closed {
                return LoadOutcome::Skipped(SkipReason::Closed);
            }
            match state.paginator.begin(self.scope(), &self.inner.config) {
                Ok(request) => request,
                Err(reason) => {
                    trace!(?reason, "Skipping load_more");
                    return LoadOutcome::Skipped(reason);
                }
            }
        };
        self.inner.bump();

        let mut in_flight = InFlight::new(&self.inner);
        let result = self.inner.fetcher.fetch_page(request).await;
        in_flight.settle();

        let outcome = {
            let mut state = self.inner.lock();
            if state.closed {
                debug!("Discarding page fetched after close");
                return LoadOutcome::Skipped(SkipReason::Closed);
            }
            let State {
                items, paginator, ..
            } = &mut *state;
            paginator.finish(result, items)
        };
        self.inner.bump();

        outcome
    }

    /// Returns a copy of the materialized list.
    pub fn items(&self) -> Vec<PollVote> {
        self.inner.lock().items.clone()
    }

    /// Returns the number of items held.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Returns true if no items are held.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// True while a page fetch is in flight.
    pub fn loading(&self) -> bool {
        self.inner.lock().paginator.is_busy()
    }

    /// The last fetch error, if the most recent fetch failed.
    pub fn error(&self) -> Option<Arc<Error>> {
        self.inner.lock().paginator.error().cloned()
    }

    /// False once the server reported the last page, or after close.
    pub fn has_next_page(&self) -> bool {
        let state = self.inner.lock();
        !state.closed && state.paginator.has_next_page()
    }

    /// True while event listeners are registered.
    pub fn is_active(&self) -> bool {
        !self.inner.lock().subscriptions.is_empty()
    }

    /// True after [`LiveCollection::close`].
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Returns the whole read model at once.
    pub fn snapshot(&self) -> CollectionSnapshot {
        let state = self.inner.lock();
        CollectionSnapshot {
            items: state.items.clone(),
            loading: state.paginator.is_busy(),
            error: state.paginator.error().cloned(),
            has_next_page: !state.closed && state.paginator.has_next_page(),
        }
    }

    /// Watch the collection's revision, which increases after every
    /// observable change.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn subscribe(&self) -> Vec<Subscription> {
        // Listeners hold a weak reference so a forgotten collection does not
        // stay alive through the event source.
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner
            .reconciler
            .subscribe(self.inner.events.as_ref(), move |kind, event| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_event(kind, event);
                }
            })
    }
}

impl fmt::Debug for LiveCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("LiveCollection")
            .field("scope", self.scope())
            .field("items", &state.items.len())
            .field("cursor", state.paginator.cursor())
            .field("loading", &state.paginator.is_busy())
            .field("active", &!state.subscriptions.is_empty())
            .field("closed", &state.closed)
            .finish()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn on_event(&self, kind: EventKind, event: &PollEvent) {
        let outcome = {
            let mut state = self.lock();
            // A handler may still be mid-delivery after its release.
            if state.closed || state.subscriptions.is_empty() {
                trace!(event = %kind, "Dropping event for inactive collection");
                return;
            }
            self.reconciler.apply(kind, event, &mut state.items)
        };

        if outcome.changed() {
            debug!(scope = %self.reconciler.scope(), event = %kind, ?outcome, "Applied poll event");
            self.bump();
        }
    }
}

/// Clears the busy flag if a fetch future is dropped before it settles.
struct InFlight<'a> {
    inner: &'a Inner,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(inner: &'a Inner) -> Self {
        Self {
            inner,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Page fetch abandoned before completion");
            self.inner.lock().paginator.abandon();
            self.inner.bump();
        }
    }
}
