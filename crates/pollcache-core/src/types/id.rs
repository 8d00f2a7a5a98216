//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Longest identifier accepted, in bytes.
pub const MAX_ID_LEN: usize = 256;

fn validate(kind: &'static str, s: &str) -> Result<(), Error> {
    let reason = if s.is_empty() {
        "must not be empty"
    } else if s.trim() != s {
        "must not have leading or trailing whitespace"
    } else if s.len() > MAX_ID_LEN {
        "must be at most 256 bytes"
    } else {
        return Ok(());
    };

    Err(InvalidInputError::Id {
        kind,
        value: s.to_string(),
        reason: reason.to_string(),
    }
    .into())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new ", $kind, ", validating the format.")]
            ///
            /// # Errors
            ///
            /// Returns an error if the string is empty, padded with whitespace,
            /// or longer than [`MAX_ID_LEN`].
            pub fn new(s: impl Into<String>) -> Result<Self, Error> {
                let s = s.into();
                validate($kind, &s)?;
                Ok(Self(s))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a poll.
    PollId,
    "poll id"
);

string_id!(
    /// Identifier of one option within a poll.
    OptionId,
    "option id"
);

string_id!(
    /// Identifier of a vote or answer record.
    VoteId,
    "vote id"
);

string_id!(
    /// Identifier of the user who cast a vote.
    UserId,
    "user id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        let poll = PollId::new("poll-1").unwrap();
        assert_eq!(poll.as_str(), "poll-1");
        assert_eq!(poll.to_string(), "poll-1");
        assert_eq!("opt:a".parse::<OptionId>().unwrap().as_str(), "opt:a");
    }

    #[test]
    fn invalid_empty() {
        assert!(VoteId::new("").is_err());
    }

    #[test]
    fn invalid_padded() {
        let err = UserId::new(" u1").unwrap_err();
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn invalid_too_long() {
        assert!(PollId::new("x".repeat(MAX_ID_LEN + 1)).is_err());
        assert!(PollId::new("x".repeat(MAX_ID_LEN)).is_ok());
    }

    #[test]
    fn serde_as_plain_string() {
        let id: VoteId = serde_json::from_str("\"v1\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"v1\"");
        assert!(serde_json::from_str::<VoteId>("\"\"").is_err());
    }
}
