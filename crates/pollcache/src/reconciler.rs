//! Applying live vote events to a materialized list.

use std::sync::Arc;

use tracing::trace;

use pollcache_core::{EventKind, EventSource, PollEvent, PollVote, Scope, Subscription};

use crate::dedup;

/// What an event did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The record was placed at the front; `replaced` if an older copy was dropped.
    Upserted { replaced: bool },
    /// The record left the list.
    Removed,
    /// The list was not touched.
    Ignored(IgnoreReason),
}

impl Reconciled {
    /// Returns true if the list changed.
    pub fn changed(&self) -> bool {
        !matches!(self, Reconciled::Ignored(_))
    }
}

/// Why an event left the list untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The payload names no poll.
    MissingPoll,
    /// The payload carries no record.
    MissingVote,
    /// The event belongs to another poll.
    OtherPoll,
    /// The record does not belong to this scope.
    OutOfScope,
    /// The record to remove is not in the list.
    NotPresent,
}

/// Decides how each vote event affects one scope's list.
#[derive(Debug, Clone)]
pub struct EventReconciler {
    scope: Scope,
}

impl EventReconciler {
    /// Create a reconciler for `scope`.
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Returns the scope events are matched against.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Register `handler` once for every [`EventKind`].
    ///
    /// The handler receives the kind it was registered under, independent of
    /// what the payload claims.
    pub fn subscribe<F>(&self, source: &dyn EventSource, handler: F) -> Vec<Subscription>
    where
        F: Fn(EventKind, &PollEvent) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        EventKind::ALL
            .into_iter()
            .map(|kind| {
                let handler = handler.clone();
                source.subscribe(kind, Arc::new(move |event: &PollEvent| handler(kind, event)))
            })
            .collect()
    }

    /// Apply one event delivered under `kind` to `items`.
    ///
    /// Casts and changes of in-scope records are upserts. A change that moves
    /// a held record out of scope removes it. Removals only touch in-scope
    /// records. Everything else, including malformed payloads, is ignored.
    pub fn apply(&self, kind: EventKind, event: &PollEvent, items: &mut Vec<PollVote>) -> Reconciled {
        let Some(poll_id) = event.poll_id() else {
            return Reconciled::Ignored(IgnoreReason::MissingPoll);
        };
        if poll_id != self.scope.poll_id() {
            return Reconciled::Ignored(IgnoreReason::OtherPoll);
        }
        let Some(vote) = event.poll_vote.as_ref() else {
            return Reconciled::Ignored(IgnoreReason::MissingVote);
        };

        let in_scope = self.scope.contains(vote);
        let outcome = match kind {
            EventKind::VoteCasted | EventKind::VoteChanged if in_scope => {
                let replaced = dedup::upsert_front(items, vote.clone()).is_some();
                Reconciled::Upserted { replaced }
            }
            // Moved to another option or turned into an answer.
            EventKind::VoteChanged => remove_held(items, vote),
            EventKind::VoteRemoved if in_scope => remove_held(items, vote),
            _ => Reconciled::Ignored(IgnoreReason::OutOfScope),
        };

        trace!(event = %kind, vote = %vote.id, ?outcome, "Reconciled event");
        outcome
    }
}

fn remove_held(items: &mut Vec<PollVote>, vote: &PollVote) -> Reconciled {
    match dedup::remove_by_id(items, vote.id.as_str()) {
        Some(_) => Reconciled::Removed,
        None => Reconciled::Ignored(IgnoreReason::NotPresent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pollcache_core::{OptionId, PollId, PollRef, VoteId};

    fn option_scope(option: &str) -> Scope {
        Scope::OptionVotes {
            poll_id: PollId::new("p1").unwrap(),
            option_id: OptionId::new(option).unwrap(),
        }
    }

    fn vote(id: &str, option: &str) -> PollVote {
        PollVote::vote(
            VoteId::new(id).unwrap(),
            OptionId::new(option).unwrap(),
            Utc::now(),
        )
    }

    fn event(kind: EventKind, poll: &str, vote: PollVote) -> PollEvent {
        PollEvent::new(kind, PollId::new(poll).unwrap(), vote)
    }

    fn ids(items: &[PollVote]) -> Vec<&str> {
        items.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn cast_in_scope_prepends() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p1", vote("v2", "optA")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Upserted { replaced: false });
        assert_eq!(ids(&items), ["v2", "v1"]);
    }

    #[test]
    fn repeated_cast_does_not_duplicate() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA"), vote("v2", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p1", vote("v2", "optA")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Upserted { replaced: true });
        assert_eq!(ids(&items), ["v2", "v1"]);
    }

    #[test]
    fn change_out_of_scope_removes_held_vote() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteChanged,
            &event(EventKind::VoteChanged, "p1", vote("v1", "optB")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Removed);
        assert!(items.is_empty());
    }

    #[test]
    fn change_of_vote_never_held_is_ignored() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteChanged,
            &event(EventKind::VoteChanged, "p1", vote("v9", "optC")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Ignored(IgnoreReason::NotPresent));
        assert_eq!(ids(&items), ["v1"]);
    }

    #[test]
    fn cast_out_of_scope_is_ignored_even_if_id_held() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p1", vote("v1", "optB")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Ignored(IgnoreReason::OutOfScope));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn other_poll_is_ignored() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = Vec::new();

        let outcome = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p2", vote("v1", "optA")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Ignored(IgnoreReason::OtherPoll));
        assert!(items.is_empty());
    }

    #[test]
    fn removal_only_touches_matching_id() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA"), vote("v2", "optA"), vote("v3", "optA")];

        let missing = reconciler.apply(
            EventKind::VoteRemoved,
            &event(EventKind::VoteRemoved, "p1", vote("v9", "optA")),
            &mut items,
        );
        assert_eq!(missing, Reconciled::Ignored(IgnoreReason::NotPresent));
        assert_eq!(items.len(), 3);

        let removed = reconciler.apply(
            EventKind::VoteRemoved,
            &event(EventKind::VoteRemoved, "p1", vote("v2", "optA")),
            &mut items,
        );
        assert_eq!(removed, Reconciled::Removed);
        assert_eq!(ids(&items), ["v1", "v3"]);
    }

    #[test]
    fn removal_out_of_scope_is_ignored() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let outcome = reconciler.apply(
            EventKind::VoteRemoved,
            &event(EventKind::VoteRemoved, "p1", vote("v1", "optB")),
            &mut items,
        );

        assert_eq!(outcome, Reconciled::Ignored(IgnoreReason::OutOfScope));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn answers_scope_ignores_plain_votes() {
        let reconciler = EventReconciler::new(Scope::Answers {
            poll_id: PollId::new("p1").unwrap(),
        });
        let mut items = Vec::new();

        let plain = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p1", vote("v1", "optA")),
            &mut items,
        );
        assert_eq!(plain, Reconciled::Ignored(IgnoreReason::OutOfScope));

        let answer = PollVote::answer(VoteId::new("a1").unwrap(), "tacos", Utc::now());
        let cast = reconciler.apply(
            EventKind::VoteCasted,
            &event(EventKind::VoteCasted, "p1", answer),
            &mut items,
        );
        assert_eq!(cast, Reconciled::Upserted { replaced: false });
        assert_eq!(ids(&items), ["a1"]);
    }

    #[test]
    fn malformed_payloads_are_ignored() {
        let reconciler = EventReconciler::new(option_scope("optA"));
        let mut items = vec![vote("v1", "optA")];

        let no_poll = PollEvent {
            kind: EventKind::VoteRemoved,
            poll: None,
            poll_vote: Some(vote("v1", "optA")),
            created_at: None,
        };
        assert_eq!(
            reconciler.apply(EventKind::VoteRemoved, &no_poll, &mut items),
            Reconciled::Ignored(IgnoreReason::MissingPoll)
        );

        let no_vote = PollEvent {
            kind: EventKind::VoteRemoved,
            poll: Some(PollRef {
                id: PollId::new("p1").unwrap(),
            }),
            poll_vote: None,
            created_at: None,
        };
        assert_eq!(
            reconciler.apply(EventKind::VoteRemoved, &no_vote, &mut items),
            Reconciled::Ignored(IgnoreReason::MissingVote)
        );
        assert_eq!(items.len(), 1);
    }
}
