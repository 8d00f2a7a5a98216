//! Id-keyed merging of ordered item lists.
//!
//! Every mutation of a materialized list goes through here, so a list built
//! only with these functions never holds two entries with the same id.

use std::collections::HashSet;

use pollcache_core::PollVote;

/// Items that carry a stable identity.
pub trait Identified {
    /// Returns the item's id.
    fn id(&self) -> &str;
}

impl Identified for PollVote {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Append the items of `incoming` whose ids are not yet in `list`.
///
/// The first occurrence of each id wins, including repeats within
/// `incoming`. Returns how many items were appended.
pub fn append_unique<T: Identified>(list: &mut Vec<T>, incoming: impl IntoIterator<Item = T>) -> usize {
    let mut seen: HashSet<String> = list.iter().map(|item| item.id().to_owned()).collect();
    let before = list.len();

    for item in incoming {
        if seen.insert(item.id().to_owned()) {
            list.push(item);
        }
    }

    list.len() - before
}

/// Put `item` at the front, dropping any earlier entry with the same id.
///
/// Returns the replaced entry.
pub fn upsert_front<T: Identified>(list: &mut Vec<T>, item: T) -> Option<T> {
    let replaced = remove_by_id(list, item.id());
    list.insert(0, item);
    replaced
}

/// Remove the entry with `id`, if present.
pub fn remove_by_id<T: Identified>(list: &mut Vec<T>, id: &str) -> Option<T> {
    let position = list.iter().position(|item| item.id() == id)?;
    Some(list.remove(position))
}
