//! Page query and result types.
//!
//! These mirror the arguments a page fetcher receives: a filter object, a set
//! of options carrying the resume token, and a sort specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::PollVote;

/// Field that every listing is ordered by unless the caller says otherwise.
pub const CREATED_AT: &str = "created_at";

/// A filter object: field name to expected value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, replacing any existing one on the same field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the expected value for `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Overlay `overrides` on top of this filter.
    pub fn merged(&self, overrides: &Filter) -> Filter {
        let mut merged = self.0.clone();
        for (field, value) in &overrides.0 {
            merged.insert(field.clone(), value.clone());
        }
        Filter(merged)
    }

    /// Iterate over the conditions.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns true if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sort direction, encoded as `1` / `-1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    Ascending,
    Descending,
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Ascending),
            -1 => Ok(Direction::Descending),
            other => Err(format!("sort direction must be 1 or -1, got {}", other)),
        }
    }
}

/// One field of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

/// An ordered sort specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(Vec<SortField>);

impl Sort {
    /// Newest first by creation time.
    pub fn default_order() -> Self {
        Sort::default().then(CREATED_AT, Direction::Descending)
    }

    /// Append a field, or replace its direction if already present.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        let field = field.into();
        match self.0.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.0.push(SortField { field, direction }),
        }
        self
    }

    /// Overlay `overrides`: same-named fields keep their position, new ones go last.
    pub fn merged(&self, overrides: &Sort) -> Sort {
        overrides
            .0
            .iter()
            .fold(self.clone(), |sort, f| sort.then(f.field.clone(), f.direction))
    }

    /// Returns the direction for `field`, if it is part of the sort.
    pub fn direction_of(&self, field: &str) -> Option<Direction> {
        self.0.iter().find(|f| f.field == field).map(|f| f.direction)
    }

    /// Returns the sort fields in order.
    pub fn fields(&self) -> &[SortField] {
        &self.0
    }
}

/// Paging options sent with a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Maximum number of items per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Resume token from the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageOptions {
    /// Returns a copy that resumes from `next`.
    pub fn with_next(&self, next: impl Into<String>) -> Self {
        Self {
            next: Some(next.into()),
            ..self.clone()
        }
    }
}

/// Arguments for one page fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub filter: Filter,
    pub options: PageOptions,
    pub sort: Sort,
}

/// One fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Items in server order.
    pub items: Vec<PollVote>,

    /// Resume token; absent when no further pages exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
