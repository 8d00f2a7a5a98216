//! Live poll events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};
use crate::types::{PollId, PollVote};

/// The vote mutation events a collection listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A vote or answer was created.
    #[serde(rename = "poll.vote_casted")]
    VoteCasted,

    /// A vote moved to another option, or an answer was edited.
    #[serde(rename = "poll.vote_changed")]
    VoteChanged,

    /// A vote or answer was withdrawn.
    #[serde(rename = "poll.vote_removed")]
    VoteRemoved,
}

impl EventKind {
    /// Every event kind, in subscription order.
    pub const ALL: [EventKind; 3] = [
        EventKind::VoteCasted,
        EventKind::VoteChanged,
        EventKind::VoteRemoved,
    ];

    /// Returns the wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::VoteCasted => "poll.vote_casted",
            EventKind::VoteChanged => "poll.vote_changed",
            EventKind::VoteRemoved => "poll.vote_removed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                InvalidInputError::EventKind {
                    value: s.to_string(),
                }
                .into()
            })
    }
}

/// The poll an event pertains to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRef {
    pub id: PollId,
}

/// A live event payload.
///
/// Delivery is best effort, so both the poll and the record are optional;
/// consumers drop events that lack either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollEvent {
    /// The event name.
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// The poll the event pertains to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollRef>,

    /// The created, changed, or removed record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_vote: Option<PollVote>,

    /// When the server emitted the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PollEvent {
    /// Create a complete event for `vote` on `poll_id`.
    pub fn new(kind: EventKind, poll_id: PollId, vote: PollVote) -> Self {
        Self {
            kind,
            poll: Some(PollRef { id: poll_id }),
            poll_vote: Some(vote),
            created_at: Some(Utc::now()),
        }
    }

    /// Returns the poll id carried by the event, if any.
    pub fn poll_id(&self) -> Option<&PollId> {
        self.poll.as_ref().map(|poll| &poll.id)
    }
}
