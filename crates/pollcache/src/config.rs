//! Collection configuration.

use serde::{Deserialize, Serialize};

use pollcache_core::page::{Filter, PageOptions, PageRequest, Sort};
use pollcache_core::{Cursor, Scope};

/// Page size used when neither the config nor the caller options set one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Tuning and caller overrides for one live collection.
///
/// `filter`, `options`, and `sort` are layered on top of what the scope and
/// the paginator derive; caller values win on conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Fetch the first page on the first activation of an empty collection.
    pub load_first_page: bool,

    /// Limit applied when `options.limit` is unset.
    pub page_size: Option<u32>,

    /// Extra filter conditions.
    pub filter: Filter,

    /// Extra paging options.
    pub options: PageOptions,

    /// Extra sort fields, applied over newest-first.
    pub sort: Sort,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            load_first_page: true,
            page_size: Some(DEFAULT_PAGE_SIZE),
            filter: Filter::default(),
            options: PageOptions::default(),
            sort: Sort::default(),
        }
    }
}

impl CollectionConfig {
    /// Enable or disable the automatic first page.
    pub fn with_load_first_page(mut self, load_first_page: bool) -> Self {
        self.load_first_page = load_first_page;
        self
    }

    /// Set the default page size.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set extra filter conditions.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Set extra paging options.
    pub fn with_options(mut self, options: PageOptions) -> Self {
        self.options = options;
        self
    }

    /// Set extra sort fields.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Build the request for the page after `cursor`.
    pub fn page_request(&self, scope: &Scope, cursor: &Cursor) -> PageRequest {
        let mut options = match cursor.as_next() {
            Some(next) => self.options.with_next(next),
            None => self.options.clone(),
        };
        if options.limit.is_none() {
            options.limit = self.page_size;
        }

        PageRequest {
            filter: scope.filter().merged(&self.filter),
            options,
            sort: Sort::default_order().merged(&self.sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollcache_core::page::{CREATED_AT, Direction};
    use pollcache_core::{OptionId, PollId};
    use serde_json::json;

    fn scope() -> Scope {
        Scope::OptionVotes {
            poll_id: PollId::new("p1").unwrap(),
            option_id: OptionId::new("optA").unwrap(),
        }
    }

    #[test]
    fn first_request_has_no_next() {
        let request = CollectionConfig::default().page_request(&scope(), &Cursor::Unstarted);

        assert_eq!(request.filter.get("option_id"), Some(&json!("optA")));
        assert_eq!(request.options.next, None);
        assert_eq!(request.options.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(request.sort, Sort::default_order());
    }

    #[test]
    fn cursor_overrides_caller_next() {
        let config = CollectionConfig::default().with_options(PageOptions {
            limit: Some(3),
            next: Some("caller".to_string()),
        });

        let resumed = config.page_request(&scope(), &Cursor::Next("c1".to_string()));
        assert_eq!(resumed.options.next.as_deref(), Some("c1"));
        assert_eq!(resumed.options.limit, Some(3));

        let first = config.page_request(&scope(), &Cursor::Unstarted);
        assert_eq!(first.options.next.as_deref(), Some("caller"));
    }

    #[test]
    fn caller_sort_and_filter_layer_on_top() {
        let config = CollectionConfig::default()
            .with_filter(Filter::new().with("user_id", "alice"))
            .with_sort(Sort::default().then(CREATED_AT, Direction::Ascending));

        let request = config.page_request(&scope(), &Cursor::Unstarted);

        assert_eq!(request.filter.get("user_id"), Some(&json!("alice")));
        assert_eq!(request.filter.get("option_id"), Some(&json!("optA")));
        assert_eq!(request.sort.direction_of(CREATED_AT), Some(Direction::Ascending));
        assert_eq!(request.sort.fields().len(), 1);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: CollectionConfig =
            serde_json::from_value(json!({ "load_first_page": false })).unwrap();
        assert!(!config.load_first_page);
        assert_eq!(config.page_size, Some(DEFAULT_PAGE_SIZE));
    }
}
