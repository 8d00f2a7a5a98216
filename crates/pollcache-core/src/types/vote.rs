//! Poll vote and answer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OptionId, PollId, UserId, VoteId};

/// A vote on a poll option, or a free-text answer to a poll.
///
/// Both kinds travel through the same events and the same record shape;
/// [`PollVote::is_answer`] tells them apart. Records are treated as immutable
/// values: a change is always a whole-record replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVote {
    /// Unique id of this vote or answer.
    pub id: VoteId,

    /// The poll this record belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_id: Option<PollId>,

    /// The option voted for. Absent for answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_id: Option<OptionId>,

    /// The voting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Free-text answer body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,

    /// Set by the server on answer records.
    #[serde(default)]
    pub is_answer: bool,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record last changed, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PollVote {
    /// Create an option vote.
    pub fn vote(id: VoteId, option_id: OptionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            poll_id: None,
            option_id: Some(option_id),
            user_id: None,
            answer_text: None,
            is_answer: false,
            created_at,
            updated_at: None,
        }
    }

    /// Create a free-text answer.
    pub fn answer(id: VoteId, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            poll_id: None,
            option_id: None,
            user_id: None,
            answer_text: Some(text.into()),
            is_answer: true,
            created_at,
            updated_at: None,
        }
    }

    /// Attach the owning poll.
    pub fn with_poll(mut self, poll_id: PollId) -> Self {
        self.poll_id = Some(poll_id);
        self
    }

    /// Attach the voting user.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Returns true if this record is a free-text answer rather than an option vote.
    pub fn is_answer(&self) -> bool {
        self.is_answer || self.answer_text.is_some()
    }
}
