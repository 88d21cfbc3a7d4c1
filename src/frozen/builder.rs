// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Accumulating entries for a [`FrozenMap`][crate::FrozenMap].
//!
//! A builder is an append-only list of entries, plus optionally a
//! comparator to order them by value. Nothing is checked until one of the
//! build methods is called, and a builder may be built from any number of
//! times: each build sees every entry appended so far.
//!
//! Building from a borrowed builder shares its entries with the new map
//! rather than copying them. Should the builder be appended to again
//! afterwards, it makes itself a private copy first, so maps already
//! built are never affected.

use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Error as FmtError, Formatter};
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

use archery::{SharedPointer, SharedPointerKind};

use crate::config::BUILDER_MIN_CAPACITY;
use crate::error::Error;
use crate::frozen::entry::Entry;
use crate::frozen::map::GenericFrozenMap;
use crate::nodes::table::{Arena, DuplicatePolicy, Table, ValueOrder};
use crate::shared_ptr::DefaultSharedPtr;
use crate::util::clone_ref;

/// Type alias for [`GenericBuilder`] that uses [`std::hash::RandomState`] as the default hasher and [`DefaultSharedPtr`] as the pointer type.
///
/// [`std::hash::RandomState`]: https://doc.rust-lang.org/stable/std/collections/hash_map/struct.RandomState.html
pub type Builder<K, V> = GenericBuilder<K, V, RandomState, DefaultSharedPtr>;

type SharedOrder<V, P> = SharedPointer<Box<ValueOrder<V>>, P>;

/// A builder for [`GenericFrozenMap`]s.
///
/// # Examples
///
/// ```
/// # use frozenmap::{Builder, Error};
/// let mut builder = Builder::new();
/// builder.put("a", 1).put("b", 2);
/// let map = builder.build_or_throw()?;
/// assert_eq!(Some(&2), map.get("b"));
///
/// builder.put("a", 3);
/// assert!(builder.build_or_throw().is_err());
/// assert_eq!(Some(&3), builder.build_keeping_last().get("a"));
/// assert_eq!(Some(&1), map.get("a"));
/// # Ok::<(), Error>(())
/// ```
pub struct GenericBuilder<K, V, S, P: SharedPointerKind> {
    entries: SharedPointer<Vec<Entry<K, V>>, P>,
    value_order: Option<SharedOrder<V, P>>,
    hasher: S,
}

fn order_of<V, P: SharedPointerKind>(order: &Option<SharedOrder<V, P>>) -> Option<&ValueOrder<V>> {
    order.as_ref().map(|order| &***order)
}

impl<K, V, P> GenericBuilder<K, V, RandomState, P>
where
    P: SharedPointerKind,
{
    /// Construct an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Construct an empty builder with room for `expected_size` entries.
    ///
    /// The expected size is a hint: putting more entries than that is
    /// fine.
    #[must_use]
    pub fn with_capacity(expected_size: usize) -> Self {
        Self::with_capacity_and_hasher(expected_size, RandomState::new())
    }
}

impl<K, V, S, P> GenericBuilder<K, V, S, P>
where
    P: SharedPointerKind,
{
    /// Construct an empty builder whose maps will use the given hasher.
    #[inline]
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        GenericBuilder {
            entries: SharedPointer::new(Vec::new()),
            value_order: None,
            hasher,
        }
    }

    /// Construct an empty builder with room for `expected_size` entries,
    /// whose maps will use the given hasher.
    #[must_use]
    pub fn with_capacity_and_hasher(expected_size: usize, hasher: S) -> Self {
        GenericBuilder {
            entries: SharedPointer::new(Vec::with_capacity(expected_size)),
            value_order: None,
            hasher,
        }
    }

    /// Get the number of entries put so far, counting repeated keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Test whether no entries have been put yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order the entries of built maps by value, using `order`.
    ///
    /// Entries with equal values keep the order they were put in. This
    /// can only be set once per builder: a second call fails with
    /// [`Error::IllegalBuilderState`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::{Builder, Error};
    /// let mut builder = Builder::new();
    /// builder.put("c", 3).put("a", 1).put("b", 2);
    /// builder.order_entries_by_value(|a: &i32, b: &i32| a.cmp(b))?;
    /// let map = builder.build_or_throw()?;
    /// assert_eq!(vec![&"a", &"b", &"c"], map.keys().collect::<Vec<_>>());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn order_entries_by_value<F>(&mut self, order: F) -> Result<&mut Self, Error>
    where
        F: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        if self.value_order.is_some() {
            return Err(Error::IllegalBuilderState("value ordering was already set"));
        }
        let order: Box<ValueOrder<V>> = Box::new(order);
        self.value_order = Some(SharedPointer::new(order));
        Ok(self)
    }

    /// Look up the two entries a [`Error::DuplicateKey`] from this
    /// builder refers to.
    ///
    /// Returns `None` for any other error, or if the builder no longer
    /// has entries at those positions.
    #[must_use]
    pub fn conflict(&self, error: &Error) -> Option<(&Entry<K, V>, &Entry<K, V>)> {
        match *error {
            Error::DuplicateKey { first, second } => {
                Some((self.entries.get(first)?, self.entries.get(second)?))
            }
            _ => None,
        }
    }
}

impl<K, V, S, P> GenericBuilder<K, V, S, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    fn arena_mut(&mut self) -> &mut Vec<Entry<K, V>> {
        let entries = SharedPointer::make_mut(&mut self.entries);
        if entries.capacity() == 0 {
            entries.reserve(BUILDER_MIN_CAPACITY);
        }
        entries
    }

    /// Append a key/value pair.
    ///
    /// Keys are not checked for duplicates until the map is built.
    ///
    /// Time: O(1)*
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> &mut Self {
        self.arena_mut().push(Entry::new(key, value));
        self
    }

    /// Append an entry.
    #[inline]
    pub fn put_entry(&mut self, entry: Entry<K, V>) -> &mut Self {
        self.arena_mut().push(entry);
        self
    }

    /// Append every key/value pair from an iterator, in order.
    pub fn put_all<I>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.put_all_entries(pairs.into_iter().map(Entry::from))
    }

    /// Append every entry from an iterator, in order.
    pub fn put_all_entries<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        let entries = entries.into_iter();
        let arena = self.arena_mut();
        arena.reserve(entries.size_hint().0);
        arena.extend(entries);
        self
    }

    /// Append key/value pairs where either may be absent.
    ///
    /// The whole input is checked before anything is appended: if any key
    /// or value is `None`, this fails with [`Error::NullArgument`] and the
    /// builder is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::{Builder, Error};
    /// let mut builder = Builder::new();
    /// let result = builder.try_put_all(vec![(Some(1), Some(1)), (Some(2), None)]);
    /// assert_eq!(Some(Error::NullArgument { what: "value" }), result.err());
    /// assert!(builder.is_empty());
    /// ```
    pub fn try_put_all<I>(&mut self, pairs: I) -> Result<&mut Self, Error>
    where
        I: IntoIterator<Item = (Option<K>, Option<V>)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| Entry::try_new(key, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.put_all_entries(entries))
    }

    /// Append all of another builder's entries after this one's.
    ///
    /// The other builder's value ordering, if any, is not carried over.
    pub fn combine(&mut self, other: Self) -> &mut Self {
        if self.entries.is_empty() {
            self.entries = other.entries;
        } else if !other.entries.is_empty() {
            let other = clone_ref(other.entries);
            self.arena_mut().extend(other);
        }
        self
    }
}

impl<K, V, S, P> GenericBuilder<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
    P: SharedPointerKind,
{
    fn finish(
        arena: Arena<K, V, P>,
        policy: DuplicatePolicy<'_, K, V>,
        order: Option<&ValueOrder<V>>,
        hasher: S,
    ) -> Result<GenericFrozenMap<K, V, S, P>, Error> {
        Table::construct(arena, policy, order, hasher).map(GenericFrozenMap::from_table)
    }

    fn finish_resolving(
        arena: Arena<K, V, P>,
        policy: DuplicatePolicy<'_, K, V>,
        order: Option<&ValueOrder<V>>,
        hasher: S,
    ) -> GenericFrozenMap<K, V, S, P> {
        debug_assert!(!matches!(policy, DuplicatePolicy::Reject));
        match Self::finish(arena, policy, order, hasher) {
            Ok(map) => map,
            Err(_) => unreachable!("only rejecting repeated keys can fail"),
        }
    }

    /// Build a map from the entries put so far, failing if any key was
    /// put more than once.
    ///
    /// The error names the positions of the first two entries found to
    /// share a key; use [`conflict`][GenericBuilder::conflict] to get at
    /// the entries themselves. The builder is unaffected and can be built
    /// from again.
    ///
    /// Time: O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::{Builder, Error};
    /// let mut builder = Builder::new();
    /// builder.put("x", 1).put("y", 2).put("x", 3);
    /// let error = builder.build_or_throw().unwrap_err();
    /// assert_eq!(Error::DuplicateKey { first: 0, second: 2 }, error);
    /// let (a, b) = builder.conflict(&error).unwrap();
    /// assert_eq!((&"x", &1, &3), (a.key(), a.value(), b.value()));
    /// ```
    pub fn build_or_throw(&self) -> Result<GenericFrozenMap<K, V, S, P>, Error> {
        Self::finish(
            Arena::Shared(self.entries.clone()),
            DuplicatePolicy::Reject,
            order_of(&self.value_order),
            self.hasher.clone(),
        )
    }

    /// Same as [`build_or_throw`][GenericBuilder::build_or_throw].
    #[inline]
    pub fn build(&self) -> Result<GenericFrozenMap<K, V, S, P>, Error> {
        self.build_or_throw()
    }

    /// Build a map from the entries put so far. Where a key was put more
    /// than once, the last value put wins.
    ///
    /// The key stays where it was first put, unless the map is ordered by
    /// value, in which case its last entry is the one that gets sorted.
    ///
    /// Time: O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::Builder;
    /// let mut builder = Builder::new();
    /// builder.put("x", 1).put("y", 2).put("x", 3);
    /// let map = builder.build_keeping_last();
    /// assert_eq!(
    ///     vec![(&"x", &3), (&"y", &2)],
    ///     map.iter().collect::<Vec<_>>()
    /// );
    /// ```
    #[must_use]
    pub fn build_keeping_last(&self) -> GenericFrozenMap<K, V, S, P> {
        Self::finish_resolving(
            Arena::Shared(self.entries.clone()),
            DuplicatePolicy::KeepLast,
            order_of(&self.value_order),
            self.hasher.clone(),
        )
    }

    /// Build a map like [`build_or_throw`][GenericBuilder::build_or_throw],
    /// handing the builder's entries over instead of sharing them.
    pub fn into_map_or_throw(self) -> Result<GenericFrozenMap<K, V, S, P>, Error> {
        let GenericBuilder {
            entries,
            value_order,
            hasher,
        } = self;
        Self::finish(
            Arena::Owned(clone_ref(entries)),
            DuplicatePolicy::Reject,
            order_of(&value_order),
            hasher,
        )
    }

    /// Build a map like
    /// [`build_keeping_last`][GenericBuilder::build_keeping_last], handing
    /// the builder's entries over instead of sharing them.
    #[must_use]
    pub fn into_map_keeping_last(self) -> GenericFrozenMap<K, V, S, P> {
        let GenericBuilder {
            entries,
            value_order,
            hasher,
        } = self;
        Self::finish_resolving(
            Arena::Owned(clone_ref(entries)),
            DuplicatePolicy::KeepLast,
            order_of(&value_order),
            hasher,
        )
    }

    /// Build a map from the entries put so far. Where a key was put more
    /// than once, its values are combined in the order they were put,
    /// with `merge(key, earlier, later)` returning the value to keep.
    ///
    /// The key stays where it was first put. If the map is ordered by
    /// value, the combined value is the one that gets sorted.
    ///
    /// Time: O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::Builder;
    /// let mut builder = Builder::new();
    /// builder.put("x", 1).put("y", 2).put("x", 3).put("x", 4);
    /// let map = builder.build_merging(|_, total, more| total + more);
    /// assert_eq!(
    ///     vec![(&"x", &8), (&"y", &2)],
    ///     map.iter().collect::<Vec<_>>()
    /// );
    /// ```
    #[must_use]
    pub fn build_merging<F>(&self, mut merge: F) -> GenericFrozenMap<K, V, S, P>
    where
        F: FnMut(&K, V, V) -> V,
    {
        Self::finish_resolving(
            Arena::Shared(self.entries.clone()),
            DuplicatePolicy::Merge(&mut merge),
            order_of(&self.value_order),
            self.hasher.clone(),
        )
    }

    /// Build a map like [`build_merging`][GenericBuilder::build_merging],
    /// handing the builder's entries over instead of sharing them.
    #[must_use]
    pub fn into_map_merging<F>(self, mut merge: F) -> GenericFrozenMap<K, V, S, P>
    where
        F: FnMut(&K, V, V) -> V,
    {
        let GenericBuilder {
            entries,
            value_order,
            hasher,
        } = self;
        Self::finish_resolving(
            Arena::Owned(clone_ref(entries)),
            DuplicatePolicy::Merge(&mut merge),
            order_of(&value_order),
            hasher,
        )
    }

    /// Build a map whose index skips straight to the flood resistant
    /// layout, failing on repeated keys.
    ///
    /// Value ordering isn't supported here, and fails with
    /// [`Error::IllegalBuilderState`].
    #[doc(hidden)]
    pub fn build_hash_backed(&self) -> Result<GenericFrozenMap<K, V, S, P>, Error> {
        if self.value_order.is_some() {
            return Err(Error::IllegalBuilderState(
                "a hash backed map can't be ordered by value",
            ));
        }
        Table::construct_hash_backed(
            Arena::Shared(self.entries.clone()),
            DuplicatePolicy::Reject,
            self.hasher.clone(),
        )
        .map(GenericFrozenMap::from_table)
    }
}

// Core traits

impl<K, V, S, P> Clone for GenericBuilder<K, V, S, P>
where
    S: Clone,
    P: SharedPointerKind,
{
    /// Clone a builder.
    ///
    /// Time: O(1), the entries are copied on the next write to either.
    #[inline]
    fn clone(&self) -> Self {
        GenericBuilder {
            entries: self.entries.clone(),
            value_order: self.value_order.clone(),
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, S, P> Default for GenericBuilder<K, V, S, P>
where
    S: Default,
    P: SharedPointerKind,
{
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S, P> Debug for GenericBuilder<K, V, S, P>
where
    K: Debug,
    V: Debug,
    P: SharedPointerKind,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_struct("Builder")
            .field("entries", &*self.entries)
            .field("ordered_by_value", &self.value_order.is_some())
            .finish()
    }
}

impl<K, V, S, P> Extend<(K, V)> for GenericBuilder<K, V, S, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    #[inline]
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.put_all(iter);
    }
}

impl<K, V, S, P> Extend<Entry<K, V>> for GenericBuilder<K, V, S, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
{
    #[inline]
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        self.put_all_entries(iter);
    }
}

impl<K, V, S, P> FromIterator<(K, V)> for GenericBuilder<K, V, S, P>
where
    K: Clone,
    V: Clone,
    S: Default,
    P: SharedPointerKind,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut builder = Self::default();
        builder.put_all(iter);
        builder
    }
}

// Tests
