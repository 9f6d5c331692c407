//! The ordered, key-addressable collection.
//!
//! A [`Collection`] maps case-normalized string keys to items and keeps
//! insertion order. It is a value: every transform returns a new collection
//! and leaves the receiver untouched. Items are cloned into the result,
//! which for [`Item`] shares the underlying data rather than copying it.
//!
//! Mutation is confined to [`CollectionBuilder`], used while constructing.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::attribute::Item;
use crate::error::{QuarryError, Result};
use crate::pagination::Pagination;

/// An ordered map from lower-cased keys to items.
///
/// # Example
///
/// ```
/// use quarry::{record, Collection, Item};
///
/// let pages = Collection::builder()
///     .set("Home", Item::record(record([("title", "Home")])))
///     .set("about", Item::record(record([("title", "About us")])))
///     .build();
///
/// assert!(pages.get("home").is_some());
/// assert!(pages.get("HOME").is_some());
/// assert_eq!(pages.keys().collect::<Vec<_>>(), ["home", "about"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T = Item> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
    pagination: Option<Pagination>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            entries: Vec::new(),
            index: HashMap::new(),
            pagination: None,
        }
    }
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

impl<T> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Collection::default()
    }

    /// Starts building a collection.
    pub fn builder() -> CollectionBuilder<T> {
        CollectionBuilder::new()
    }

    /// Creates a collection keyed by position (`"0"`, `"1"`, ...).
    pub fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        let mut collection = Collection::new();
        for (position, item) in items.into_iter().enumerate() {
            collection.insert(&position.to_string(), item);
        }
        collection
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Same as [`count`](Collection::count); pairs with
    /// [`is_empty`](Collection::is_empty) for the usual `len`/`is_empty` API.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_even(&self) -> bool {
        self.count() % 2 == 0
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    /// Looks up an item by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index_of(key).map(|position| &self.entries[position].1)
    }

    /// Returns `true` if the key is present, ignoring case.
    pub fn has(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Position of the key in the current order.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(&normalize(key)).copied()
    }

    /// The first item in current order.
    pub fn first(&self) -> Option<&T> {
        self.entries.first().map(|(_, item)| item)
    }

    /// The last item in current order.
    pub fn last(&self) -> Option<&T> {
        self.entries.last().map(|(_, item)| item)
    }

    /// The item at position `n` in current order.
    pub fn nth(&self, n: usize) -> Option<&T> {
        self.entries.get(n).map(|(_, item)| item)
    }

    /// Keys in current order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Items in current order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(_, item)| item)
    }

    /// Key/item pairs in current order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Pagination recorded by the [`paginate`](Collection::paginate) call
    /// that produced this collection, if any.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Applies `f` to every item, keeping keys and order.
    pub fn map<U, F>(&self, mut f: F) -> Collection<U>
    where
        F: FnMut(&T) -> U,
    {
        Collection {
            entries: self
                .entries
                .iter()
                .map(|(key, item)| (key.clone(), f(item)))
                .collect(),
            index: self.index.clone(),
            pagination: self.pagination,
        }
    }

    /// Materializes the items, transformed by `f`, in current order.
    pub fn to_array_with<U, F>(&self, f: F) -> Vec<U>
    where
        F: FnMut(&T) -> U,
    {
        self.values().map(f).collect()
    }

    fn insert(&mut self, key: &str, item: T) {
        let key = normalize(key);
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = item,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, item));
            }
        }
    }

    fn remove_key(&mut self, key: &str) {
        if let Some(position) = self.index_of(key) {
            self.entries.remove(position);
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, (key, _))| (key.clone(), position))
            .collect();
    }

    /// Builds a collection from entries whose keys are already normalized
    /// and unique, carrying over the pagination metadata.
    fn derive(&self, entries: Vec<(String, T)>) -> Self {
        let mut collection = Collection {
            entries,
            index: HashMap::new(),
            pagination: self.pagination,
        };
        collection.reindex();
        collection
    }
}

impl<T: Clone> Collection<T> {
    /// Returns a copy with the item appended, or replaced in place if the
    /// key already exists.
    pub fn append(&self, key: &str, item: T) -> Self {
        let mut collection = self.clone();
        collection.insert(key, item);
        collection
    }

    /// Returns a copy with the item placed first. An existing item with the
    /// same key is dropped.
    pub fn prepend(&self, key: &str, item: T) -> Self {
        let key = normalize(key);
        let mut entries = Vec::with_capacity(self.count() + 1);
        entries.push((key.clone(), item));
        entries.extend(self.entries.iter().filter(|(k, _)| *k != key).cloned());
        self.derive(entries)
    }

    /// Returns a copy with `items` merged in; later keys overwrite earlier
    /// ones in place.
    pub fn extend<K, I>(&self, items: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, T)>,
    {
        let mut collection = self.clone();
        for (key, item) in items {
            collection.insert(key.as_ref(), item);
        }
        collection
    }

    /// Returns a copy without the given key.
    pub fn remove(&self, key: &str) -> Self {
        let mut collection = self.clone();
        collection.remove_key(key);
        collection
    }

    /// Returns a copy without the given keys. Absent keys are ignored.
    pub fn not<K, I>(&self, keys: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let mut excluded = vec![false; self.count()];
        for key in keys {
            if let Some(position) = self.index_of(key.as_ref()) {
                excluded[position] = true;
            }
        }
        self.derive(
            self.entries
                .iter()
                .zip(excluded)
                .filter(|(_, excluded)| !excluded)
                .map(|(entry, _)| entry.clone())
                .collect(),
        )
    }

    /// Returns `limit` items starting at `offset`; `None` means "to the end".
    /// `slice(0, None)` returns the collection unchanged.
    pub fn slice(&self, offset: usize, limit: Option<usize>) -> Self {
        if offset == 0 && limit.is_none() {
            return self.clone();
        }
        let take = limit.unwrap_or(usize::MAX);
        self.derive(self.entries.iter().skip(offset).take(take).cloned().collect())
    }

    /// Returns every item from position `offset` on.
    pub fn offset(&self, offset: usize) -> Self {
        self.slice(offset, None)
    }

    /// Returns at most the first `limit` items.
    pub fn limit(&self, limit: usize) -> Self {
        self.slice(0, Some(limit))
    }

    /// Splits the collection into consecutive chunks of at most `size`
    /// items. Chunks keep their items' keys and are keyed `"0"`, `"1"`, ...
    pub fn chunk(&self, size: usize) -> Result<Collection<Collection<T>>> {
        if size == 0 {
            return Err(QuarryError::InvalidArgument(
                "chunk size must be at least 1".into(),
            ));
        }
        let mut chunks = Collection::from_items(
            self.entries
                .chunks(size)
                .map(|entries| self.derive(entries.to_vec())),
        );
        chunks.pagination = self.pagination;
        Ok(chunks)
    }

    /// Returns the items in reverse order.
    pub fn flip(&self) -> Self {
        self.derive(self.entries.iter().rev().cloned().collect())
    }

    /// Returns the items in random order.
    pub fn shuffle(&self) -> Self {
        self.shuffle_with(&mut rand::rng())
    }

    /// Returns the items in an order drawn from `rng`.
    pub fn shuffle_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..self.count()).collect();
        order.shuffle(rng);
        self.reorder(&order)
    }

    /// Returns an empty collection.
    pub fn empty(&self) -> Self {
        self.derive(Vec::new())
    }

    /// Materializes the items in current order.
    pub fn to_array(&self) -> Vec<T> {
        self.values().cloned().collect()
    }

    /// Returns page `page` of `limit` items per page and records the
    /// [`Pagination`] on the result.
    pub fn paginate(&self, limit: usize, page: usize) -> Result<Self> {
        let pagination = Pagination::new(self.count(), limit, page)?;
        let mut collection = self.slice(pagination.offset(), Some(pagination.limit()));
        collection.pagination = Some(pagination);
        Ok(collection)
    }

    /// Returns the items at the given positions, in that order.
    pub(crate) fn reorder(&self, order: &[usize]) -> Self {
        self.derive(order.iter().map(|&i| self.entries[i].clone()).collect())
    }

    /// Returns the items whose positions are flagged in `keep`.
    pub(crate) fn retain_positions(&self, keep: &[bool]) -> Self {
        self.derive(
            self.entries
                .iter()
                .zip(keep)
                .filter(|(_, keep)| **keep)
                .map(|(entry, _)| entry.clone())
                .collect(),
        )
    }
}

impl<T: Serialize> Collection<T> {
    /// Encodes the collection as a JSON object in current order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.count()))?;
        for (key, item) in &self.entries {
            map.serialize_entry(key, item)?;
        }
        map.end()
    }
}

impl<T> fmt::Display for Collection<T> {
    /// Writes the keys joined by `<br />`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, key) in self.keys().enumerate() {
            if position > 0 {
                f.write_str("<br />")?;
            }
            f.write_str(key)?;
        }
        Ok(())
    }
}

impl<K: AsRef<str>, T> FromIterator<(K, T)> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for (key, item) in iter {
            collection.insert(key.as_ref(), item);
        }
        collection
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = (&'a str, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the key/item pairs of a [`Collection`].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    inner: std::slice::Iter<'a, (String, T)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a str, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, item)| (key.as_str(), item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, item)| (key.as_str(), item))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Builder for constructing a [`Collection`].
///
/// This is the only place where a collection is mutated.
#[derive(Debug, Clone)]
pub struct CollectionBuilder<T = Item> {
    collection: Collection<T>,
}

impl<T> Default for CollectionBuilder<T> {
    fn default() -> Self {
        CollectionBuilder {
            collection: Collection::new(),
        }
    }
}

impl<T> CollectionBuilder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        CollectionBuilder::default()
    }

    /// Inserts an item, or overwrites the item with the same key (ignoring
    /// case) in its original position.
    pub fn set(mut self, key: &str, item: T) -> Self {
        self.collection.insert(key, item);
        self
    }

    /// Inserts every pair, as [`set`](CollectionBuilder::set) would.
    pub fn set_many<K, I>(mut self, items: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, T)>,
    {
        for (key, item) in items {
            self.collection.insert(key.as_ref(), item);
        }
        self
    }

    /// Removes the item with the given key, if present.
    pub fn remove(mut self, key: &str) -> Self {
        self.collection.remove_key(key);
        self
    }

    /// Finishes construction.
    pub fn build(self) -> Collection<T> {
        self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn letters(keys: &str) -> Collection<String> {
        keys.chars()
            .map(|c| (c.to_string(), c.to_uppercase().to_string()))
            .collect()
    }

    fn keys<T>(collection: &Collection<T>) -> String {
        collection.keys().collect()
    }

    #[test]
    fn keys_are_normalized() {
        let collection = Collection::builder()
            .set("Home", 1)
            .set("ABOUT", 2)
            .build();
        assert_eq!(keys(&collection), "homeabout");
        assert_eq!(collection.get("home"), Some(&1));
        assert_eq!(collection.get("About"), Some(&2));
        assert!(collection.has("HOME"));
    }

    #[test]
    fn overwrite_keeps_position() {
        let collection = Collection::builder()
            .set("a", 1)
            .set("b", 2)
            .set("A", 3)
            .build();
        assert_eq!(keys(&collection), "ab");
        assert_eq!(collection.get("a"), Some(&3));
    }

    #[test]
    fn builder_remove() {
        let collection = Collection::builder()
            .set_many([("a", 1), ("b", 2), ("c", 3)])
            .remove("B")
            .build();
        assert_eq!(keys(&collection), "ac");
        assert_eq!(collection.index_of("c"), Some(1));
    }

    #[test]
    fn positional_access() {
        let collection = letters("abc");
        assert_eq!(collection.first().map(String::as_str), Some("A"));
        assert_eq!(collection.last().map(String::as_str), Some("C"));
        assert_eq!(collection.nth(1).map(String::as_str), Some("B"));
        assert_eq!(collection.nth(3), None);

        let empty = Collection::<String>::new();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }

    #[test]
    fn from_items_uses_positions() {
        let collection = Collection::from_items(["x", "y"]);
        assert_eq!(collection.get("0"), Some(&"x"));
        assert_eq!(collection.get("1"), Some(&"y"));
    }

    #[test]
    fn not_excludes_and_ignores_absent() {
        let collection = letters("abcd");
        let result = collection.not(["B", "d", "zz"]);
        assert_eq!(keys(&result), "ac");
        assert_eq!(keys(&collection), "abcd");
    }

    #[test]
    fn remove_returns_copy() {
        let collection = letters("abc");
        assert_eq!(keys(&collection.remove("b")), "ac");
        assert_eq!(keys(&collection), "abc");
    }

    #[test]
    fn slicing() {
        let collection = letters("abcde");
        assert_eq!(keys(&collection.slice(1, Some(2))), "bc");
        assert_eq!(keys(&collection.slice(3, None)), "de");
        assert_eq!(keys(&collection.slice(9, None)), "");
        assert_eq!(keys(&collection.offset(2)), "cde");
        assert_eq!(keys(&collection.limit(2)), "ab");
        assert_eq!(collection.slice(0, None), collection);
    }

    #[test]
    fn derived_index_is_rebuilt() {
        let sliced = letters("abcde").slice(2, None);
        assert_eq!(sliced.index_of("c"), Some(0));
        assert_eq!(sliced.get("e").map(String::as_str), Some("E"));
        assert_eq!(sliced.get("a"), None);
    }

    #[test]
    fn chunking() {
        let chunks = letters("abcde").chunk(2).unwrap();
        let sizes: Vec<usize> = chunks.values().map(Collection::count).collect();
        assert_eq!(sizes, [2, 2, 1]);
        assert_eq!(keys(&chunks), "012");
        assert_eq!(chunks.get("1").map(keys), Some("cd".to_string()));
    }

    #[test]
    fn chunk_size_zero_is_rejected() {
        assert!(matches!(
            letters("ab").chunk(0),
            Err(QuarryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn flip_reverses() {
        assert_eq!(keys(&letters("abc").flip()), "cba");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let collection = letters("abcdefgh");
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = collection.shuffle_with(&mut rng);

        let mut sorted: Vec<&str> = shuffled.keys().collect();
        sorted.sort_unstable();
        assert_eq!(sorted.concat(), "abcdefgh");
        for (key, item) in &shuffled {
            assert_eq!(item, &key.to_uppercase());
        }

        let again = collection.shuffle_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(keys(&again), keys(&shuffled));
    }

    #[test]
    fn extend_merges() {
        let collection = letters("ab");
        let extended = collection.extend([("B", "b2".to_string()), ("c", "C".to_string())]);
        assert_eq!(keys(&extended), "abc");
        assert_eq!(extended.get("b").map(String::as_str), Some("b2"));
        assert_eq!(collection.get("b").map(String::as_str), Some("B"));
    }

    #[test]
    fn append_and_prepend() {
        let collection = letters("ab");
        assert_eq!(keys(&collection.append("c", "C".into())), "abc");
        assert_eq!(keys(&collection.prepend("z", "Z".into())), "zab");

        let moved = collection.prepend("B", "new".into());
        assert_eq!(keys(&moved), "ba");
        assert_eq!(moved.get("b").map(String::as_str), Some("new"));
    }

    #[test]
    fn map_returns_new_collection() {
        let collection = letters("ab");
        let lengths = collection.map(|item| item.len() * 10);
        assert_eq!(lengths.get("a"), Some(&10));
        assert_eq!(collection.get("a").map(String::as_str), Some("A"));
    }

    #[test]
    fn empty_clears_items() {
        let empty = letters("ab").empty();
        assert!(empty.is_empty());
        assert!(empty.is_even());
        assert!(letters("abc").is_odd());
    }

    #[test]
    fn len_matches_count() {
        let collection = letters("abc");
        assert_eq!(collection.len(), collection.count());
        assert_eq!(letters("").len(), 0);
    }

    #[test]
    fn arrays() {
        let collection = letters("ab");
        assert_eq!(collection.to_array(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(collection.to_array_with(|s| s.to_lowercase()), ["a", "b"]);
    }

    #[test]
    fn json_is_an_ordered_object() {
        let collection: Collection<i32> = [("z", 1), ("a", 2)].into_iter().collect();
        assert_eq!(collection.to_json().unwrap(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn display_joins_keys() {
        assert_eq!(letters("abc").to_string(), "a<br />b<br />c");
    }

    #[test]
    fn paginate_records_window() {
        let collection = letters("abcdefg");
        let page = collection.paginate(3, 2).unwrap();
        assert_eq!(keys(&page), "def");

        let pagination = page.pagination().unwrap();
        assert_eq!(pagination.total(), 7);
        assert_eq!(pagination.page(), 2);
        assert_eq!(pagination.limit(), 3);
        assert!(collection.pagination().is_none());

        // Derived collections carry the metadata along
        assert!(page.flip().pagination().is_some());
    }

    #[test]
    fn paginate_last_page() {
        let page = letters("abcdefg").paginate(3, 3).unwrap();
        assert_eq!(keys(&page), "g");
    }
}
