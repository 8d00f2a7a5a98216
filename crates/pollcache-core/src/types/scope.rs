//! Collection scope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{OptionId, PollId, PollVote};
use crate::page::Filter;

/// The identity that decides which records and events belong to a collection.
///
/// A scope always names a poll. Answer collections cover every answer of
/// that poll; option collections cover the plain votes cast for one option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// All free-text answers of a poll.
    Answers { poll_id: PollId },

    /// Votes cast for one option of a poll.
    OptionVotes { poll_id: PollId, option_id: OptionId },
}

impl Scope {
    /// Returns the poll this scope belongs to.
    pub fn poll_id(&self) -> &PollId {
        match self {
            Scope::Answers { poll_id } | Scope::OptionVotes { poll_id, .. } => poll_id,
        }
    }

    /// Returns the option for option-vote scopes.
    pub fn option_id(&self) -> Option<&OptionId> {
        match self {
            Scope::Answers { .. } => None,
            Scope::OptionVotes { option_id, .. } => Some(option_id),
        }
    }

    /// Returns true if `vote` currently belongs to this scope.
    ///
    /// The poll is not checked here; events carry the poll identity
    /// separately from the record.
    pub fn contains(&self, vote: &PollVote) -> bool {
        match self {
            Scope::Answers { .. } => vote.is_answer(),
            Scope::OptionVotes { option_id, .. } => {
                !vote.is_answer() && vote.option_id.as_ref() == Some(option_id)
            }
        }
    }

    /// The server-side filter that selects this scope's records.
    pub fn filter(&self) -> Filter {
        match self {
            Scope::Answers { .. } => Filter::new().with("is_answer", Value::Bool(true)),
            Scope::OptionVotes { option_id, .. } => {
                Filter::new().with("option_id", Value::String(option_id.to_string()))
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Answers { poll_id } => write!(f, "poll/{}/answers", poll_id),
            Scope::OptionVotes { poll_id, option_id } => {
                write!(f, "poll/{}/options/{}", poll_id, option_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoteId;
    use chrono::Utc;

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

    #[test]
    fn option_scope_matches_its_option_only() {
        let scope = option_scope("optA");
        assert!(scope.contains(&vote("v1", "optA")));
        assert!(!scope.contains(&vote("v1", "optB")));
    }

    #[test]
    fn scopes_split_answers_from_votes() {
        let answers = Scope::Answers {
            poll_id: PollId::new("p1").unwrap(),
        };
        let answer = PollVote::answer(VoteId::new("a1").unwrap(), "maybe", Utc::now());

        assert!(answers.contains(&answer));
        assert!(!answers.contains(&vote("v1", "optA")));

        let mut answer_on_option = answer.clone();
        answer_on_option.option_id = Some(OptionId::new("optA").unwrap());
        assert!(!option_scope("optA").contains(&answer_on_option));
    }

    #[test]
    fn filter_shape() {
        let filter = option_scope("optA").filter();
        assert_eq!(filter.get("option_id"), Some(&Value::from("optA")));

        let answers = Scope::Answers {
            poll_id: PollId::new("p1").unwrap(),
        };
        assert_eq!(answers.filter().get("is_answer"), Some(&Value::Bool(true)));
    }

    #[test]
    fn display() {
        assert_eq!(option_scope("optA").to_string(), "poll/p1/options/optA");
    }
}
