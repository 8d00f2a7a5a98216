//! In-memory vote storage with live event publishing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use pollcache_core::error::{Error, FetchError, InvalidInputError};
use pollcache_core::{
    EventHandler, EventKind, EventSource, OptionId, PollEvent, PollId, PollVote, Result,
    Subscription, UserId, VoteId,
};

use crate::fetcher::MemoryFetcher;
use crate::listeners::ListenerRegistry;

#[derive(Debug, Default)]
struct StoreState {
    votes: Vec<PollVote>,
    failures: VecDeque<FetchError>,
    fetches: usize,
}

/// Votes and answers for any number of polls, plus their listeners.
///
/// Handles are cheap to clone and share one store. Every mutation publishes
/// the matching event synchronously, after the store lock is released.
#[derive(Debug, Clone, Default)]
pub struct MemoryPollStore {
    state: Arc<Mutex<StoreState>>,
    listeners: ListenerRegistry,
}

fn missing_poll(vote: &PollVote) -> Error {
    InvalidInputError::Other {
        message: format!("vote '{}' has no poll_id", vote.id),
    }
    .into()
}

fn unknown_vote(id: &VoteId) -> Error {
    InvalidInputError::UnknownVote { id: id.to_string() }.into()
}

fn generate_vote_id() -> VoteId {
    // A v4 uuid is never empty, padded, or overlong.
    VoteId::new(Uuid::new_v4().to_string()).unwrap_or_else(|_| unreachable!())
}

impl MemoryPollStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a record without publishing an event. Replaces any record with the same id.
    pub fn insert(&self, vote: PollVote) -> Result<()> {
        if vote.poll_id.is_none() {
            return Err(missing_poll(&vote));
        }
        let mut state = self.lock();
        state.votes.retain(|v| v.id != vote.id);
        state.votes.push(vote);
        Ok(())
    }

    /// Store `vote` and publish a cast event for it.
    #[instrument(skip(self, vote), fields(vote = %vote.id))]
    pub fn cast(&self, vote: PollVote) -> Result<PollVote> {
        let poll_id = vote.poll_id.clone().ok_or_else(|| missing_poll(&vote))?;
        Ok(self.store_and_publish(EventKind::VoteCasted, poll_id, vote))
    }

    /// Cast a new vote for `option_id` on behalf of `user_id`.
    pub fn cast_vote(&self, poll_id: &PollId, option_id: &OptionId, user_id: &UserId) -> PollVote {
        let vote = PollVote::vote(generate_vote_id(), option_id.clone(), Utc::now())
            .with_poll(poll_id.clone())
            .with_user(user_id.clone());
        self.store_and_publish(EventKind::VoteCasted, poll_id.clone(), vote)
    }

    /// Add a free-text answer on behalf of `user_id`.
    pub fn add_answer(&self, poll_id: &PollId, user_id: &UserId, text: &str) -> PollVote {
        let answer = PollVote::answer(generate_vote_id(), text, Utc::now())
            .with_poll(poll_id.clone())
            .with_user(user_id.clone());
        self.store_and_publish(EventKind::VoteCasted, poll_id.clone(), answer)
    }

    /// Move a vote to another option and publish a changed event.
    #[instrument(skip(self))]
    pub fn change_vote(&self, vote_id: &VoteId, option_id: &OptionId) -> Result<PollVote> {
        self.modify(vote_id, |vote| {
            vote.option_id = Some(option_id.clone());
            vote.is_answer = false;
            vote.answer_text = None;
        })
    }

    /// Replace the text of an answer and publish a changed event.
    #[instrument(skip(self, text))]
    pub fn update_answer(&self, vote_id: &VoteId, text: &str) -> Result<PollVote> {
        self.modify(vote_id, |vote| {
            vote.answer_text = Some(text.to_string());
            vote.is_answer = true;
            vote.option_id = None;
        })
    }

    /// Delete a vote or answer and publish a removed event.
    #[instrument(skip(self))]
    pub fn remove_vote(&self, vote_id: &VoteId) -> Result<PollVote> {
        let removed = {
            let mut state = self.lock();
            let position = state
                .votes
                .iter()
                .position(|v| &v.id == vote_id)
                .ok_or_else(|| unknown_vote(vote_id))?;
            state.votes.remove(position)
        };

        let poll_id = removed.poll_id.clone().ok_or_else(|| missing_poll(&removed))?;
        self.publish(PollEvent::new(EventKind::VoteRemoved, poll_id, removed.clone()));
        debug!(vote = %removed.id, "Removed vote");
        Ok(removed)
    }

    /// Deliver a raw event to the registered listeners without touching storage.
    ///
    /// Returns how many listeners received it.
    pub fn publish(&self, event: PollEvent) -> usize {
        let delivered = self.listeners.dispatch(&event);
        debug!(event = %event.kind, delivered, "Published poll event");
        delivered
    }

    /// Returns every record of `poll_id`, in insertion order.
    pub fn votes(&self, poll_id: &PollId) -> Vec<PollVote> {
        self.lock()
            .votes
            .iter()
            .filter(|v| v.poll_id.as_ref() == Some(poll_id))
            .cloned()
            .collect()
    }

    /// A page fetcher over the records of `poll_id`.
    pub fn fetcher(&self, poll_id: PollId) -> MemoryFetcher {
        MemoryFetcher::new(self.clone(), poll_id)
    }

    /// Make the next page fetch fail with `error`. Failures queue up in order.
    pub fn fail_next_fetch(&self, error: FetchError) {
        self.lock().failures.push_back(error);
    }

    /// Number of page fetches served or failed so far.
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    /// Number of registered listeners across all event kinds.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Count one fetch and return the records of `poll_id`, or the queued failure.
    pub(crate) fn begin_fetch(&self, poll_id: &PollId) -> Result<Vec<PollVote>> {
        let mut state = self.lock();
        state.fetches += 1;
        if let Some(error) = state.failures.pop_front() {
            return Err(error.into());
        }
        Ok(state
            .votes
            .iter()
            .filter(|v| v.poll_id.as_ref() == Some(poll_id))
            .cloned()
            .collect())
    }

    fn store_and_publish(&self, kind: EventKind, poll_id: PollId, vote: PollVote) -> PollVote {
        {
            let mut state = self.lock();
            state.votes.retain(|v| v.id != vote.id);
            state.votes.push(vote.clone());
        }
        self.publish(PollEvent::new(kind, poll_id, vote.clone()));
        vote
    }

    fn modify(&self, vote_id: &VoteId, change: impl FnOnce(&mut PollVote)) -> Result<PollVote> {
        let updated = {
            let mut state = self.lock();
            let vote = state
                .votes
                .iter_mut()
                .find(|v| &v.id == vote_id)
                .ok_or_else(|| unknown_vote(vote_id))?;
            change(vote);
            vote.updated_at = Some(Utc::now());
            vote.clone()
        };

        let poll_id = updated.poll_id.clone().ok_or_else(|| missing_poll(&updated))?;
        self.publish(PollEvent::new(EventKind::VoteChanged, poll_id, updated.clone()));
        Ok(updated)
    }
}

impl EventSource for MemoryPollStore {
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        self.listeners.register(kind, handler)
    }
}
