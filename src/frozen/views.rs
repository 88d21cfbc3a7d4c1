// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Read only views of a [`FrozenMap`][crate::FrozenMap].
//!
//! Each view is created the first time it's asked for and kept for as
//! long as the map, so asking again hands out the same view. Views
//! point at the map's table rather than the map, and cloning a view
//! gives an owned handle which keeps the table alive on its own.
//!
//! All views list their contents in the map's iteration order, so the
//! `i`th key, the `i`th value and the `i`th entry always belong
//! together.

use std::borrow::Borrow;
use std::fmt::{Debug, Error as FmtError, Formatter};
use std::hash::{BuildHasher, Hash};
use std::slice;
use std::sync::OnceLock;

use archery::{SharedPointer, SharedPointerKind};

use crate::frozen::entry::Entry;
use crate::frozen::map::{Keys, Values};
use crate::frozen::multimap::MultimapView;
use crate::nodes::table::Table;

/// The per-map cache of views.
pub(crate) struct Views<K, V, S, P: SharedPointerKind> {
    pub(crate) entry_set: OnceLock<EntrySet<K, V, S, P>>,
    pub(crate) key_set: OnceLock<KeySet<K, V, S, P>>,
    pub(crate) values: OnceLock<ValuesView<K, V, S, P>>,
    pub(crate) multimap: OnceLock<MultimapView<K, V, S, P>>,
}

impl<K, V, S, P: SharedPointerKind> Views<K, V, S, P> {
    pub(crate) fn new() -> Self {
        Views {
            entry_set: OnceLock::new(),
            key_set: OnceLock::new(),
            values: OnceLock::new(),
            multimap: OnceLock::new(),
        }
    }
}

// Entry set

/// The entries of a map, as a set.
///
/// Membership is decided by key lookup, so [`contains`][EntrySet::contains]
/// is O(1) like a lookup on the map itself.
pub struct EntrySet<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
}

impl<K, V, S, P: SharedPointerKind> EntrySet<K, V, S, P> {
    pub(crate) fn new(table: SharedPointer<Table<K, V, S, P>, P>) -> Self {
        EntrySet { table }
    }

    /// Get the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Test whether the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the entries as a slice, in iteration order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Entry<K, V>] {
        self.table.entries()
    }

    /// Get the entry at position `index` in iteration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry<K, V>> {
        self.as_slice().get(index)
    }

    /// Get an iterator over the entries.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Entry<K, V>> {
        self.as_slice().iter()
    }
}

impl<K, V, S, P> EntrySet<K, V, S, P>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Test whether the map holds `entry`'s key, mapped to `entry`'s value.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn contains(&self, entry: &Entry<K, V>) -> bool {
        self.table
            .get(entry.key())
            .is_some_and(|found| found.value() == entry.value())
    }
}

impl<K, V, S, P: SharedPointerKind> Clone for EntrySet<K, V, S, P> {
    fn clone(&self) -> Self {
        EntrySet::new(self.table.clone())
    }
}

impl<K, V, S1, S2, P1, P2> PartialEq<EntrySet<K, V, S2, P2>> for EntrySet<K, V, S1, P1>
where
    K: Hash + Eq,
    V: PartialEq,
    S1: BuildHasher,
    S2: BuildHasher,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &EntrySet<K, V, S2, P2>) -> bool {
        self.len() == other.len() && self.iter().all(|entry| other.contains(entry))
    }
}

impl<K, V, S, P> Eq for EntrySet<K, V, S, P>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
}

impl<K: Debug, V: Debug, S, P: SharedPointerKind> Debug for EntrySet<K, V, S, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a EntrySet<K, V, S, P> {
    type Item = &'a Entry<K, V>;
    type IntoIter = slice::Iter<'a, Entry<K, V>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Key set

/// The keys of a map, as a set.
pub struct KeySet<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
}

impl<K, V, S, P: SharedPointerKind> KeySet<K, V, S, P> {
    pub(crate) fn new(table: SharedPointer<Table<K, V, S, P>, P>) -> Self {
        KeySet { table }
    }

    /// Get the number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Test whether the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the key at position `index` in iteration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&K> {
        self.table.entries().get(index).map(Entry::key)
    }

    /// Get an iterator over the keys.
    #[inline]
    pub fn iter(&self) -> Keys<'_, K, V> {
        Keys::new(self.table.entries())
    }
}

impl<K, V, S, P> KeySet<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Test whether the set contains `key`.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn contains<BK>(&self, key: &BK) -> bool
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.table.position(key).is_some()
    }
}

impl<K, V, S, P: SharedPointerKind> Clone for KeySet<K, V, S, P> {
    fn clone(&self) -> Self {
        KeySet::new(self.table.clone())
    }
}

impl<K, V, S1, S2, P1, P2> PartialEq<KeySet<K, V, S2, P2>> for KeySet<K, V, S1, P1>
where
    K: Hash + Eq,
    S1: BuildHasher,
    S2: BuildHasher,
    P1: SharedPointerKind,
    P2: SharedPointerKind,
{
    fn eq(&self, other: &KeySet<K, V, S2, P2>) -> bool {
        self.len() == other.len() && self.iter().all(|key| other.contains(key))
    }
}

impl<K, V, S, P> Eq for KeySet<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
}

impl<K: Debug, V, S, P: SharedPointerKind> Debug for KeySet<K, V, S, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a KeySet<K, V, S, P> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Values

/// The values of a map, in iteration order, repeats included.
pub struct ValuesView<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
}

impl<K, V, S, P: SharedPointerKind> ValuesView<K, V, S, P> {
    pub(crate) fn new(table: SharedPointer<Table<K, V, S, P>, P>) -> Self {
        ValuesView { table }
    }

    /// Get the number of values, which is the number of entries in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Test whether there are no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the value at position `index` in iteration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&V> {
        self.table.entries().get(index).map(Entry::value)
    }

    /// Get an iterator over the values.
    #[inline]
    pub fn iter(&self) -> Values<'_, K, V> {
        Values::new(self.table.entries())
    }

    /// Test whether any key maps to `value`.
    ///
    /// Time: O(n)
    #[must_use]
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }
}

impl<K, V, S, P: SharedPointerKind> Clone for ValuesView<K, V, S, P> {
    fn clone(&self) -> Self {
        ValuesView::new(self.table.clone())
    }
}

impl<K, V: Debug, S, P: SharedPointerKind> Debug for ValuesView<K, V, S, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a ValuesView<K, V, S, P> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Tests
