//! Page queries over the in-memory store.
//!
//! Pages are cut with a keyset cursor of the form `<created_at micros>:<id>`
//! naming the last record served, so records cast after a page was served
//! never shift later pages.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, instrument};

use pollcache_core::error::InvalidInputError;
use pollcache_core::page::{CREATED_AT, Direction, Filter};
use pollcache_core::{Page, PageFetcher, PageRequest, PollId, PollVote, Result};

use crate::store::MemoryPollStore;

/// Page size used when the request carries no positive limit.
pub const DEFAULT_LIMIT: u32 = 25;

/// Serves the votes and answers of one poll, page by page.
///
/// Only equality filters are understood. Ordering honours the direction of
/// `created_at` and breaks ties by id; other sort fields are ignored.
#[derive(Debug, Clone)]
pub struct MemoryFetcher {
    store: MemoryPollStore,
    poll_id: PollId,
}

impl MemoryFetcher {
    pub(crate) fn new(store: MemoryPollStore, poll_id: PollId) -> Self {
        Self { store, poll_id }
    }

    /// Returns the poll this fetcher serves.
    pub fn poll_id(&self) -> &PollId {
        &self.poll_id
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    #[instrument(skip(self, request), fields(poll = %self.poll_id))]
    async fn fetch_page(&self, request: PageRequest) -> Result<Page> {
        let votes = self.store.begin_fetch(&self.poll_id)?;
        let after = request.options.next.as_deref().map(CursorKey::decode).transpose()?;

        let direction = request
            .sort
            .direction_of(CREATED_AT)
            .unwrap_or(Direction::Descending);
        let limit = request
            .options
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT) as usize;

        let mut matching = Vec::with_capacity(votes.len());
        for vote in votes {
            if matches(&vote, &request.filter)? {
                matching.push(vote);
            }
        }
        matching.sort_by(|a, b| compare(a, b, direction));

        let mut remaining: Vec<PollVote> = match after {
            Some(key) => matching
                .into_iter()
                .filter(|vote| key.precedes(vote, direction))
                .collect(),
            None => matching,
        };

        let more = remaining.len() > limit;
        remaining.truncate(limit);
        let next = if more {
            remaining.last().map(|last| CursorKey::of(last).encode())
        } else {
            None
        };

        debug!(served = remaining.len(), more, "Served page");
        Ok(Page {
            items: remaining,
            next,
        })
    }
}

/// Equality match of every filter field against the record's wire shape.
fn matches(vote: &PollVote, filter: &Filter) -> Result<bool> {
    if filter.is_empty() {
        return Ok(true);
    }

    let mut value = serde_json::to_value(vote).map_err(|err| InvalidInputError::Other {
        message: format!("vote '{}' is not serializable: {}", vote.id, err),
    })?;
    // Records carrying answer text count as answers even without the flag.
    if vote.is_answer() {
        if let Value::Object(fields) = &mut value {
            fields.insert("is_answer".to_string(), Value::Bool(true));
        }
    }

    Ok(filter
        .iter()
        .all(|(field, expected)| value.get(field).unwrap_or(&Value::Null) == expected))
}

/// Order by creation time at cursor precision, then by id.
fn compare(a: &PollVote, b: &PollVote, direction: Direction) -> Ordering {
    let ordering = CursorKey::of(a).cmp(&CursorKey::of(b));
    match direction {
        Direction::Ascending => ordering,
        Direction::Descending => ordering.reverse(),
    }
}

/// Position of the last record a page served.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CursorKey {
    micros: i64,
    id: String,
}

impl CursorKey {
    fn of(vote: &PollVote) -> Self {
        Self {
            micros: vote.created_at.timestamp_micros(),
            id: vote.id.to_string(),
        }
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.micros, self.id)
    }

    fn decode(cursor: &str) -> Result<Self> {
        let invalid = |reason: &str| InvalidInputError::Cursor {
            value: cursor.to_string(),
            reason: reason.to_string(),
        };

        let (micros, id) = cursor
            .split_once(':')
            .ok_or_else(|| invalid("expected '<micros>:<id>'"))?;
        let micros: i64 = micros
            .parse()
            .map_err(|_| invalid("timestamp is not an integer"))?;
        if DateTime::from_timestamp_micros(micros).is_none() {
            return Err(invalid("timestamp out of range").into());
        }
        if id.is_empty() {
            return Err(invalid("missing id").into());
        }

        Ok(Self {
            micros,
            id: id.to_string(),
        })
    }

    /// True if `vote` sorts strictly after this position.
    fn precedes(&self, vote: &PollVote, direction: Direction) -> bool {
        let ordering = self.cmp(&CursorKey::of(vote));
        match direction {
            Direction::Ascending => ordering == Ordering::Less,
            Direction::Descending => ordering == Ordering::Greater,
        }
    }
}
