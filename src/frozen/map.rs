// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An immutable map with a fixed iteration order.
//!
//! A [`FrozenMap`] is built once, through a [`Builder`][crate::Builder] or
//! one of the conversions below, and never changes afterwards. It iterates
//! in the order its entries were put into the builder, or by value if the
//! builder was asked to [order entries by
//! value][crate::GenericBuilder::order_entries_by_value].
//!
//! Lookups go through a hash index built alongside the entries. The index
//! watches for keys piling up in a handful of hash buckets, which a hostile
//! choice of keys can cause with a weak or predictable hasher, and switches
//! to a randomly keyed index when that happens, so lookups stay O(1).
//! Only a [`Hash`] implementation which collides for distinct keys
//! regardless of hasher defeats this.
//!
//! Cloning a map is O(1): clones share both the entries and the
//! [views][crate::frozen::views] derived from them.

use std::borrow::Borrow;
use std::collections;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Display, Error, Formatter};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};
use std::ops::Index;
use std::slice;

use archery::{SharedPointer, SharedPointerKind};

use crate::error::Error as BuildError;
use crate::frozen::builder::GenericBuilder;
use crate::frozen::entry::Entry;
use crate::frozen::multimap::MultimapView;
use crate::frozen::views::{EntrySet, KeySet, ValuesView, Views};
use crate::nodes::table::Table;
use crate::shared_ptr::DefaultSharedPtr;
use crate::util::stable_hash;

/// Construct a frozen map from a sequence of key/value pairs.
///
/// Repeated keys make this fail with
/// [`Error::DuplicateKey`][crate::Error::DuplicateKey].
///
/// # Examples
///
/// ```
/// # use frozenmap::{frozenmap, FrozenMap, Error};
/// let map = frozenmap! {
///     1 => 11,
///     2 => 22,
///     3 => 33,
/// }?;
/// assert_eq!(Some(&22), map.get(&2));
/// assert!(frozenmap! {1 => 11, 1 => 12}.is_err());
/// # Ok::<(), Error>(())
/// ```
#[macro_export]
macro_rules! frozenmap {
    () => { $crate::FrozenMap::try_from_iter([]) };

    ( $( $key:expr => $value:expr ),+ $(,)? ) => {
        $crate::FrozenMap::try_from_iter([ $( ($key, $value) ),+ ])
    };
}

/// Type alias for [`GenericFrozenMap`] that uses [`std::hash::RandomState`] as the default hasher and [`DefaultSharedPtr`] as the pointer type.
///
/// [`std::hash::RandomState`]: https://doc.rust-lang.org/stable/std/collections/hash_map/struct.RandomState.html
pub type FrozenMap<K, V> = GenericFrozenMap<K, V, RandomState, DefaultSharedPtr>;

/// An immutable map with a fixed iteration order.
///
/// See the [module documentation][crate::frozen::map] for an overview.
pub struct GenericFrozenMap<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
    views: SharedPointer<Views<K, V, S, P>, P>,
}

impl<K, V, S, P> GenericFrozenMap<K, V, S, P>
where
    S: Default,
    P: SharedPointerKind,
{
    /// Construct an empty map.
    ///
    /// All empty maps are [`ptr_eq`][GenericFrozenMap::ptr_eq] to each
    /// other, but there's no single shared instance: a static can't be
    /// generic over the key and value types, so each call allocates its
    /// own empty table. Clone an existing empty map, or
    /// [`copy_of`][GenericFrozenMap::copy_of] it, to share one instead.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_table(Table::empty(S::default()))
    }

    /// Construct a map with a single mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::FrozenMap;
    /// let map = FrozenMap::unit(123, "onetwothree");
    /// assert_eq!(Some(&"onetwothree"), map.get(&123));
    /// ```
    #[inline]
    #[must_use]
    pub fn unit(key: K, value: V) -> Self {
        Self::from_table(Table::singleton(Entry::new(key, value), S::default()))
    }

    /// Construct an empty builder for maps of this type.
    #[inline]
    #[must_use]
    pub fn builder() -> GenericBuilder<K, V, S, P> {
        GenericBuilder::default()
    }

    /// Construct an empty builder for maps of this type, with room for
    /// `expected_size` entries.
    #[inline]
    #[must_use]
    pub fn builder_with_expected_size(expected_size: usize) -> GenericBuilder<K, V, S, P> {
        GenericBuilder::with_capacity_and_hasher(expected_size, S::default())
    }
}

impl<K, V, S, P: SharedPointerKind> GenericFrozenMap<K, V, S, P> {
    pub(crate) fn from_table(table: Table<K, V, S, P>) -> Self {
        GenericFrozenMap {
            table: SharedPointer::new(table),
            views: SharedPointer::new(Views::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &Table<K, V, S, P> {
        &self.table
    }

    #[cfg(any(test, feature = "rayon"))]
    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        self.table.entries()
    }

    /// Test whether a map is empty.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of entries in a map.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Test whether two maps are the same map.
    ///
    /// This is true for a map and any of its clones, for a map and any
    /// [`copy_of`][GenericFrozenMap::copy_of] it, and for any two empty
    /// maps.
    ///
    /// Time: O(1)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        SharedPointer::ptr_eq(&self.table, &other.table) || (self.is_empty() && other.is_empty())
    }

    /// Get a reference to the map's [`BuildHasher`].
    #[must_use]
    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Get an iterator over the key/value pairs of a map, in iteration
    /// order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.entries().iter(),
        }
    }

    /// Get an iterator over a map's keys, in iteration order.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.table.entries())
    }

    /// Get an iterator over a map's values, in iteration order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.table.entries())
    }

    /// Get the set of entries.
    ///
    /// The set is created on first use and the same set is returned by
    /// every call after, on this map and all of its clones.
    pub fn entry_set(&self) -> &EntrySet<K, V, S, P> {
        self.views
            .entry_set
            .get_or_init(|| EntrySet::new(self.table.clone()))
    }

    /// Get the set of keys.
    ///
    /// The set is created on first use and the same set is returned by
    /// every call after, on this map and all of its clones.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::{frozenmap, Error};
    /// let map = frozenmap! {"a" => 1, "b" => 2}?;
    /// assert!(map.key_set().contains("b"));
    /// assert!(std::ptr::eq(map.key_set(), map.clone().key_set()));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn key_set(&self) -> &KeySet<K, V, S, P> {
        self.views
            .key_set
            .get_or_init(|| KeySet::new(self.table.clone()))
    }

    /// Get the collection of values.
    ///
    /// The collection is created on first use and the same one is
    /// returned by every call after, on this map and all of its clones.
    pub fn values_view(&self) -> &ValuesView<K, V, S, P> {
        self.views
            .values
            .get_or_init(|| ValuesView::new(self.table.clone()))
    }

    /// Get the map as a multimap with exactly one value for each key.
    ///
    /// The multimap is created on first use and the same one is returned
    /// by every call after, on this map and all of its clones.
    pub fn as_multimap(&self) -> &MultimapView<K, V, S, P> {
        self.views
            .multimap
            .get_or_init(|| MultimapView::new(self.table.clone()))
    }

    /// Make a map out of anything that converts into one.
    ///
    /// Copying a frozen map gives back the same map, views included, even
    /// when it's empty. Copying a standard
    /// library map gives a frozen map with the same mappings, in the
    /// source's iteration order, which doesn't follow later changes to the
    /// source.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::FrozenMap;
    /// # use std::collections::BTreeMap;
    /// let source: BTreeMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    /// let map: FrozenMap<i32, &str> = FrozenMap::copy_of(&source);
    /// assert_eq!(vec![(&1, &"a"), (&2, &"b")], map.iter().collect::<Vec<_>>());
    /// assert!(FrozenMap::copy_of(&map).ptr_eq(&map));
    /// ```
    #[inline]
    #[must_use]
    pub fn copy_of<M: Into<Self>>(source: M) -> Self {
        source.into()
    }

    /// Sum the hashes of all entries.
    ///
    /// Each entry is hashed on its own with a fixed hasher, so two maps
    /// with the same mappings have the same hash code whatever their
    /// order, hasher or pointer type.
    #[must_use]
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        self.iter()
            .fold(0u64, |sum, pair| sum.wrapping_add(stable_hash(&pair)))
    }
}

impl<K, V, S, P> GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn test_eq<S2: BuildHasher, P2: SharedPointerKind>(
        &self,
        other: &GenericFrozenMap<K, V, S2, P2>,
    ) -> bool
    where
        V: PartialEq,
    {
        // Keys are distinct on both sides, so equal lengths and every
        // mapping found on the other side means the same mappings.
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }

    /// Get the value for a key from a map.
    ///
    /// Time: O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::FrozenMap;
    /// let map = FrozenMap::unit(123, "lol");
    /// assert_eq!(map.get(&123), Some(&"lol"));
    /// ```
    #[must_use]
    pub fn get<BK>(&self, key: &BK) -> Option<&V>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.table.get(key).map(Entry::value)
    }

    /// Get the key/value pair for a key from a map.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn get_key_value<BK>(&self, key: &BK) -> Option<(&K, &V)>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.table.get(key).map(Entry::as_pair)
    }

    /// Test for the presence of a key in a map.
    ///
    /// Time: O(1)
    #[inline]
    #[must_use]
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.table.position(key).is_some()
    }
}

impl<K, V, S, P> GenericFrozenMap<K, V, S, P>
where
    P: SharedPointerKind,
{
    /// Test whether any key maps to `value`.
    ///
    /// Time: O(n)
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, S, P> GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    /// Construct a map from key/value pairs, failing on repeated keys.
    pub fn try_from_iter<I>(pairs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = Self::builder();
        builder.put_all(pairs);
        builder.into_map_or_throw()
    }

    /// Construct a map from entries, failing on repeated keys.
    pub fn try_from_entries<I>(entries: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        let mut builder = Self::builder();
        builder.put_all_entries(entries);
        builder.into_map_or_throw()
    }
}

// Core traits

impl<K, V, S, P: SharedPointerKind> Clone for GenericFrozenMap<K, V, S, P> {
    /// Clone a map.
    ///
    /// Time: O(1)
    #[inline]
    fn clone(&self) -> Self {
        GenericFrozenMap {
            table: self.table.clone(),
            views: self.views.clone(),
        }
    }
}

impl<K, V, S1, S2, P1, P2> PartialEq<GenericFrozenMap<K, V, S2, P2>>
    for GenericFrozenMap<K, V, S1, P1>
where
    K: Hash + Eq,
    V: PartialEq,
    S1: BuildHasher,
    S2: BuildHasher,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &GenericFrozenMap<K, V, S2, P2>) -> bool {
        self.test_eq(other)
    }
}

impl<K, V, S, P> Eq for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
}

impl<K, V, S, P> Hash for GenericFrozenMap<K, V, S, P>
where
    K: Hash,
    V: Hash,
    P: SharedPointerKind,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.hash_code().hash(state);
    }
}

impl<K, V, S, P> Default for GenericFrozenMap<K, V, S, P>
where
    S: Default,
    P: SharedPointerKind,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<BK, K, V, S, P> Index<&BK> for GenericFrozenMap<K, V, S, P>
where
    BK: Hash + Eq + ?Sized,
    K: Hash + Eq + Borrow<BK>,
    S: BuildHasher,
    P: SharedPointerKind,
{
    type Output = V;

    fn index(&self, key: &BK) -> &Self::Output {
        match self.get(key) {
            None => panic!("FrozenMap::index: invalid key"),
            Some(value) => value,
        }
    }
}

impl<K, V, S, P> Debug for GenericFrozenMap<K, V, S, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let mut d = f.debug_map();
        for (k, v) in self {
            d.entry(k, v);
        }
        d.finish()
    }
}

/// Renders a map as `{key=value, key=value}`, in iteration order.
impl<K, V, S, P> Display for GenericFrozenMap<K, V, S, P>
where
    K: Display,
    V: Display,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.write_str("{")?;
        for (pos, entry) in self.table.entries().iter().enumerate() {
            if pos > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(entry, f)?;
        }
        f.write_str("}")
    }
}

// Iterators

/// An iterator over the key/value pairs of a map.
pub struct Iter<'a, K, V> {
    it: slice::Iter<'a, Entry<K, V>>,
}

// We impl Clone instead of deriving it, because we want Clone even if K and V aren't.
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Entry::as_pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(Entry::as_pair)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A consuming iterator over the key/value pairs of a map.
pub struct ConsumingIter<K, V> {
    it: std::vec::IntoIter<Entry<K, V>>,
}

impl<K, V> Iterator for ConsumingIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Entry::into_pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ConsumingIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(Entry::into_pair)
    }
}

impl<K, V> ExactSizeIterator for ConsumingIter<K, V> {}

impl<K, V> FusedIterator for ConsumingIter<K, V> {}

/// An iterator over the keys of a map.
pub struct Keys<'a, K, V> {
    it: slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(entries: &'a [Entry<K, V>]) -> Self {
        Keys { it: entries.iter() }
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Entry::key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(Entry::key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a map.
pub struct Values<'a, K, V> {
    it: slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(entries: &'a [Entry<K, V>]) -> Self {
        Values { it: entries.iter() }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Entry::value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(Entry::value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a GenericFrozenMap<K, V, S, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S, P> IntoIterator for GenericFrozenMap<K, V, S, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    type Item = (K, V);
    type IntoIter = ConsumingIter<K, V>;

    /// Iterate over the map's pairs by value. The entries are moved out if
    /// nothing else shares them, and cloned otherwise.
    fn into_iter(self) -> Self::IntoIter {
        let GenericFrozenMap { table, views } = self;
        drop(views);
        let entries = match SharedPointer::try_unwrap(table) {
            Ok(table) => table.into_entries(),
            Err(table) => table.entries().to_vec(),
        };
        ConsumingIter {
            it: entries.into_iter(),
        }
    }
}

// Conversions

impl<K, V, S, P> FromIterator<(K, V)> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    /// Collect pairs into a map. Where a key repeats, the last value
    /// wins, at the position where the key first appeared.
    fn from_iter<T>(i: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        GenericBuilder::from_iter(i).into_map_keeping_last()
    }
}

impl<K, V, S, P: SharedPointerKind> AsRef<GenericFrozenMap<K, V, S, P>>
    for GenericFrozenMap<K, V, S, P>
{
    #[inline]
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<K, V, S, P: SharedPointerKind> From<&GenericFrozenMap<K, V, S, P>>
    for GenericFrozenMap<K, V, S, P>
{
    #[inline]
    fn from(map: &GenericFrozenMap<K, V, S, P>) -> Self {
        map.clone()
    }
}

impl<K, V, S, P, const N: usize> TryFrom<[(K, V); N]> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    type Error = BuildError;

    fn try_from(pairs: [(K, V); N]) -> Result<Self, Self::Error> {
        Self::try_from_iter(pairs)
    }
}

impl<K, V, S, P> TryFrom<Vec<(K, V)>> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    type Error = BuildError;

    fn try_from(pairs: Vec<(K, V)>) -> Result<Self, Self::Error> {
        Self::try_from_iter(pairs)
    }
}

impl<'a, K, V, S, P> TryFrom<&'a [(K, V)]> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    type Error = BuildError;

    fn try_from(pairs: &'a [(K, V)]) -> Result<Self, Self::Error> {
        Self::try_from_iter(pairs.iter().cloned())
    }
}

impl<K, V, S1, S2, P> From<collections::HashMap<K, V, S2>> for GenericFrozenMap<K, V, S1, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S1: BuildHasher + Default + Clone,
    S2: BuildHasher,
    P: SharedPointerKind,
{
    fn from(m: collections::HashMap<K, V, S2>) -> Self {
        m.into_iter().collect()
    }
}

impl<'a, K, V, S1, S2, P> From<&'a collections::HashMap<K, V, S2>>
    for GenericFrozenMap<K, V, S1, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S1: BuildHasher + Default + Clone,
    S2: BuildHasher,
    P: SharedPointerKind,
{
    fn from(m: &'a collections::HashMap<K, V, S2>) -> Self {
        m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V, S, P> From<collections::BTreeMap<K, V>> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: collections::BTreeMap<K, V>) -> Self {
        m.into_iter().collect()
    }
}

impl<'a, K, V, S, P> From<&'a collections::BTreeMap<K, V>> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    fn from(m: &'a collections::BTreeMap<K, V>) -> Self {
        m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// Tests

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared_ptr::RcK;
    use crate::test::LolHasher;
    use crate::Builder;
    #[rustfmt::skip]
    use ::proptest::{collection, num::{i16, usize}, proptest};
    use metrohash::MetroHash64;
    use pretty_assertions::assert_eq;
    use static_assertions::{assert_impl_all, assert_not_impl_any};
    use std::hash::BuildHasherDefault;
    use std::thread;

    assert_impl_all!(FrozenMap<i32, i32>: Send, Sync);
    assert_not_impl_any!(FrozenMap<i32, *const i32>: Send, Sync);
    assert_not_impl_any!(FrozenMap<*const i32, i32>: Send, Sync);

    #[test]
    fn literal_scenario() {
        let map: FrozenMap<&str, i32> = frozenmap! {"a" => 1, "b" => 2, "c" => 3}.unwrap();
        assert_eq!(vec![&"a", &"b", &"c"], map.keys().collect::<Vec<_>>());
        assert_eq!(Some(&2), map.get("b"));
        assert_eq!(None, map.get("z"));
        assert_eq!(3, map.len());
    }

    #[test]
    fn literal_with_repeats_fails() {
        let result: Result<FrozenMap<&str, i32>, _> = frozenmap! {"a" => 1, "b" => 2, "a" => 3};
        assert_eq!(
            Some(BuildError::DuplicateKey {
                first: 0,
                second: 2
            }),
            result.err()
        );
    }

    #[test]
    fn index_operator() {
        let map: FrozenMap<usize, usize> = frozenmap![1 => 2, 3 => 4, 5 => 6].unwrap();
        assert_eq!(4, map[&3]);
    }

    #[test]
    #[should_panic(expected = "invalid key")]
    fn index_missing_key_panics() {
        let map: FrozenMap<usize, usize> = FrozenMap::unit(1, 2);
        let _ = map[&3];
    }

    #[test]
    fn proper_formatting() {
        let map: FrozenMap<usize, usize> = frozenmap![1 => 2, 0 => 1].unwrap();
        assert_eq!("{1: 2, 0: 1}", format!("{:?}", map));
        assert_eq!("{}", format!("{:?}", FrozenMap::<(), ()>::new()));
    }

    #[test]
    fn display_follows_iteration_order() {
        let map: FrozenMap<&str, i32> = frozenmap! {"a" => 1, "b" => 2}.unwrap();
        assert_eq!("{a=1, b=2}", map.to_string());
        let reversed: FrozenMap<&str, i32> = frozenmap! {"b" => 2, "a" => 1}.unwrap();
        assert_eq!("{b=2, a=1}", reversed.to_string());
        assert_eq!("{x=y}", FrozenMap::<char, char>::unit('x', 'y').to_string());
        assert_eq!("{}", FrozenMap::<i32, i32>::new().to_string());
    }

    #[test]
    fn macro_allows_trailing_comma() {
        let map1: FrozenMap<&str, i32> = frozenmap! {"x" => 1, "y" => 2}.unwrap();
        let map2: FrozenMap<&str, i32> = frozenmap! {
            "x" => 1,
            "y" => 2,
        }
        .unwrap();
        assert_eq!(map1, map2);
        let empty: FrozenMap<i32, i32> = frozenmap! {}.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn match_string_keys_with_string_slices() {
        let map: FrozenMap<String, i32> =
            FrozenMap::try_from(vec![("foo".to_string(), 1), ("bar".to_string(), 2)]).unwrap();
        assert_eq!(Some(&1), map.get("foo"));
        assert_eq!(Some((&"bar".to_string(), &2)), map.get_key_value("bar"));
        assert!(!map.contains_key("baz"));
        assert_eq!(2, map["bar"]);
    }

    #[test]
    fn equality_ignores_order_and_layout() {
        let forward: FrozenMap<i32, i32> = (0..50).map(|i| (i, i * i)).collect();
        let backward: GenericFrozenMap<i32, i32, BuildHasherDefault<MetroHash64>, RcK> =
            (0..50).rev().map(|i| (i, i * i)).collect();
        assert_eq!(forward, backward);
        assert_eq!(forward.hash_code(), backward.hash_code());
        let different: FrozenMap<i32, i32> = (0..50).map(|i| (i, i)).collect();
        assert_ne!(forward, different);
        let shorter: FrozenMap<i32, i32> = (0..49).map(|i| (i, i * i)).collect();
        assert_ne!(forward, shorter);
    }

    #[test]
    fn empty_maps_are_canonical() {
        let empty: FrozenMap<i32, i32> = FrozenMap::new();
        let built = Builder::<i32, i32>::new().build_or_throw().unwrap();
        assert!(empty.ptr_eq(&built));
        assert!(FrozenMap::copy_of(&empty).ptr_eq(&empty));
        let from_std: FrozenMap<i32, i32> = FrozenMap::copy_of(collections::HashMap::new());
        assert!(from_std.ptr_eq(&empty));
        assert!(!FrozenMap::unit(1, 1).ptr_eq(&empty));
    }

    #[test]
    fn copying_an_empty_map_shares_it() {
        let empty: FrozenMap<i32, i32> = FrozenMap::new();
        let copy = FrozenMap::copy_of(&empty);
        assert!(std::ptr::eq(empty.key_set(), copy.key_set()));
        assert!(std::ptr::eq(empty.entry_set(), copy.entry_set()));
        assert!(copy.ptr_eq(&empty));
    }

    #[test]
    fn copy_of_frozen_is_identity() {
        let map: FrozenMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
        let keys = map.key_set();
        let copy = FrozenMap::copy_of(map.clone());
        assert!(copy.ptr_eq(&map));
        assert!(std::ptr::eq(keys, copy.key_set()));
    }

    #[test]
    fn copy_of_std_is_defensive() {
        let mut source = collections::BTreeMap::new();
        source.insert("b", 2);
        source.insert("a", 1);
        let map: FrozenMap<&str, i32> = FrozenMap::copy_of(&source);
        source.insert("c", 3);
        assert_eq!(vec![(&"a", &1), (&"b", &2)], map.iter().collect::<Vec<_>>());
    }

    #[test]
    fn consuming_iterator() {
        let map: FrozenMap<String, usize> = ["x", "y", "z"]
            .iter()
            .enumerate()
            .map(|(i, s)| (s.to_string(), i))
            .collect();
        let shared = map.clone();
        let _ = shared.key_set();
        let pairs: Vec<(String, usize)> = map.into_iter().collect();
        assert_eq!(
            vec![("x".to_string(), 0), ("y".to_string(), 1), ("z".to_string(), 2)],
            pairs
        );
        assert_eq!(3, shared.into_iter().rev().count());
    }

    #[test]
    fn from_iterator_keeps_last() {
        let map: FrozenMap<char, i32> = vec![('a', 1), ('b', 2), ('a', 3)].into_iter().collect();
        assert_eq!(vec![(&'a', &3), (&'b', &2)], map.iter().collect::<Vec<_>>());
    }

    #[test]
    fn try_from_arrays_and_slices() {
        let pairs = [(1, 'a'), (2, 'b')];
        let from_array: FrozenMap<i32, char> = FrozenMap::try_from(pairs).unwrap();
        let from_slice: FrozenMap<i32, char> = FrozenMap::try_from(&pairs[..]).unwrap();
        assert_eq!(from_array, from_slice);
        let entries = vec![Entry::new(1, 'a'), Entry::new(1, 'b')];
        assert!(FrozenMap::try_from_entries(entries).is_err());
    }

    #[test]
    fn contains_value_is_a_scan() {
        let map: FrozenMap<i32, &str> = frozenmap! {1 => "one", 2 => "two"}.unwrap();
        assert!(map.contains_value(&"two"));
        assert!(!map.contains_value(&"three"));
    }

    #[test]
    fn deterministic_hasher_is_honoured() {
        let mut builder: GenericBuilder<u64, u64, BuildHasherDefault<MetroHash64>, RcK> =
            GenericBuilder::default();
        builder.put_all((0..1000).map(|i| (i, i + 1)));
        let map = builder.build_or_throw().unwrap();
        assert!(!map.table().is_hash_backed());
        for i in 0..1000 {
            assert_eq!(Some(&(i + 1)), map.get(&i));
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn millions_of_random_keys_stay_on_primary_layout() {
        let len = 1u64 << 21;
        let map: FrozenMap<u64, u64> = (0..len).map(|i| (i, !i)).collect();
        assert!(!map.table().is_hash_backed());
        assert_eq!(len as usize, map.len());
        for i in (0..len).step_by(4099) {
            assert_eq!(Some(&!i), map.get(&i));
        }
    }

    #[test]
    fn collisions_switch_to_keyed_index() {
        let mut builder: GenericBuilder<i16, i16, BuildHasherDefault<LolHasher<4>>, DefaultSharedPtr> =
            GenericBuilder::default();
        builder.put_all((0..1000i16).map(|i| (i, -i)));
        let map = builder.build_or_throw().unwrap();
        assert!(map.table().is_hash_backed());
        assert_eq!(1000, map.len());
        assert_eq!((0..1000i16).collect::<Vec<_>>(), map.keys().copied().collect::<Vec<_>>());
        for i in 0..1000 {
            assert_eq!(Some(&-i), map.get(&i));
        }
        assert!(!map.contains_key(&1000));
    }

    #[test]
    fn views_are_shared_between_threads() {
        let map: FrozenMap<i32, i32> = (0..100).map(|i| (i, i)).collect();
        let seen: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let map = map.clone();
                    scope.spawn(move || map.entry_set() as *const _ as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let expected = map.entry_set() as *const _ as usize;
        assert!(seen.iter().all(|&ptr| ptr == expected));
    }

    proptest! {
        #[test]
        fn lookups_match_std(ref m in collection::hash_map(i16::ANY, i16::ANY, 0..200)) {
            let map: FrozenMap<i16, i16> = FrozenMap::copy_of(m);
            assert_eq!(m.len(), map.len());
            for (k, v) in m {
                assert_eq!(Some(v), map.get(k));
            }
            assert_eq!(m.keys().copied().collect::<Vec<_>>(), map.keys().copied().collect::<Vec<_>>());
        }

        #[test]
        fn equal_maps_hash_alike(ref input in collection::vec((i16::ANY, i16::ANY), 0..100)) {
            let forward: FrozenMap<i16, i16> = input.iter().copied().collect();
            let mut rev: Vec<(i16, i16)> = forward.iter().map(|(k, v)| (*k, *v)).collect();
            rev.reverse();
            let backward: FrozenMap<i16, i16> = rev.into_iter().collect();
            assert_eq!(forward, backward);
            assert_eq!(forward.hash_code(), backward.hash_code());
        }

        #[test]
        fn views_agree_with_iteration(ref input in collection::vec((i16::ANY, i16::ANY), 0..100), idx in usize::ANY) {
            let map: FrozenMap<i16, i16> = input.iter().copied().collect();
            if !map.is_empty() {
                let i = idx % map.len();
                let (k, v) = map.iter().nth(i).unwrap();
                assert_eq!(Some(k), map.key_set().get(i));
                assert_eq!(Some(v), map.values_view().get(i));
                assert_eq!(&[*v][..], map.as_multimap().get(k));
            }
        }
    }
}
