// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A map seen as a multimap in which every key has exactly one value,
//! and that multimap's inverse.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Error as FmtError, Formatter};
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::slice;
use std::sync::OnceLock;

use archery::{SharedPointer, SharedPointerKind};
use hashbrown::hash_table::{Entry as TableEntry, HashTable};

use crate::frozen::entry::Entry;
use crate::frozen::map::Keys;
use crate::nodes::table::Table;

/// A map as a multimap from each key to the one value it maps to.
///
/// The multimap holds exactly the map's associations: it has as many
/// keys as the map, and as many key/value pairs.
///
/// # Examples
///
/// ```
/// # use frozenmap::{frozenmap, FrozenMap, Error};
/// let map: FrozenMap<&str, i32> = frozenmap! {"a" => 1, "b" => 2, "c" => 1}?;
/// let multimap = map.as_multimap();
/// assert_eq!(&[2], multimap.get("b"));
/// assert!(multimap.get("z").is_empty());
///
/// let inverse = multimap.inverse();
/// assert_eq!(vec![&"a", &"c"], inverse.get(&1).collect::<Vec<_>>());
/// # Ok::<(), Error>(())
/// ```
pub struct MultimapView<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
    inverse: OnceLock<Inverse<K, V, S, P>>,
}

impl<K, V, S, P: SharedPointerKind> MultimapView<K, V, S, P> {
    pub(crate) fn new(table: SharedPointer<Table<K, V, S, P>, P>) -> Self {
        MultimapView {
            table,
            inverse: OnceLock::new(),
        }
    }

    /// Get the number of distinct keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Get the number of key/value pairs, which for this multimap is
    /// always the number of keys.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.table.len()
    }

    /// Test whether the multimap is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over the keys.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.table.entries())
    }

    /// Get an iterator over each key with its values.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.entries().iter(),
        }
    }
}

impl<K, V, S, P> MultimapView<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Get the values for `key`: a slice of one value if the key is
    /// present, or an empty slice.
    ///
    /// Time: O(1)
    #[must_use]
    pub fn get<BK>(&self, key: &BK) -> &[V]
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        match self.table.get(key) {
            Some(entry) => slice::from_ref(entry.value()),
            None => &[],
        }
    }

    /// Test whether `key` has any values.
    #[must_use]
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.table.position(key).is_some()
    }

    /// Test whether `value` is among `key`'s values.
    #[must_use]
    pub fn contains_entry<BK>(&self, key: &BK, value: &V) -> bool
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
        V: PartialEq,
    {
        self.get(key).contains(value)
    }
}

impl<K, V, S, P> MultimapView<K, V, S, P>
where
    V: Hash + Eq,
    P: SharedPointerKind,
{
    /// Get the inverse multimap, from each value to the keys mapping to
    /// it.
    ///
    /// It's computed the first time it's asked for, and the same inverse
    /// is returned from then on.
    ///
    /// Time: O(n) the first time, O(1) after
    pub fn inverse(&self) -> &Inverse<K, V, S, P> {
        self.inverse.get_or_init(|| Inverse::new(self.table.clone()))
    }
}

impl<K, V, S, P: SharedPointerKind> Clone for MultimapView<K, V, S, P> {
    fn clone(&self) -> Self {
        MultimapView {
            table: self.table.clone(),
            inverse: self.inverse.clone(),
        }
    }
}

impl<K: Debug, V: Debug, S, P: SharedPointerKind> Debug for MultimapView<K, V, S, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a MultimapView<K, V, S, P> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the keys of a multimap, each with its values.
pub struct Iter<'a, K, V> {
    it: slice::Iter<'a, Entry<K, V>>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|entry| (entry.key(), slice::from_ref(entry.value())))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it
            .next_back()
            .map(|entry| (entry.key(), slice::from_ref(entry.value())))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// Inverse

/// The inverse of a [`MultimapView`]: each distinct value of a map, with
/// the keys that map to it.
///
/// Values are listed in the order they first appear in the map, and each
/// value's keys in the map's iteration order.
pub struct Inverse<K, V, S, P: SharedPointerKind> {
    table: SharedPointer<Table<K, V, S, P>, P>,
    // Positions of the entries holding each distinct value.
    groups: Vec<Vec<usize>>,
    index: HashTable<usize>,
    state: RandomState,
}

impl<K, V, S, P> Inverse<K, V, S, P>
where
    V: Hash + Eq,
    P: SharedPointerKind,
{
    fn new(table: SharedPointer<Table<K, V, S, P>, P>) -> Self {
        let state = RandomState::new();
        let mut index = HashTable::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let entries = table.entries();
        for (pos, entry) in entries.iter().enumerate() {
            let value = entry.value();
            let slot = index.entry(
                state.hash_one(value),
                |&group: &usize| entries[groups[group][0]].value() == value,
                |&group: &usize| state.hash_one(entries[groups[group][0]].value()),
            );
            match slot {
                TableEntry::Occupied(occupied) => groups[*occupied.get()].push(pos),
                TableEntry::Vacant(vacant) => {
                    vacant.insert(groups.len());
                    groups.push(vec![pos]);
                }
            }
        }
        Inverse {
            table,
            groups,
            index,
            state,
        }
    }

    fn group<BV>(&self, value: &BV) -> Option<&[usize]>
    where
        BV: Hash + Eq + ?Sized,
        V: Borrow<BV>,
    {
        let entries = self.table.entries();
        self.index
            .find(self.state.hash_one(value), |&group| {
                entries[self.groups[group][0]].value().borrow() == value
            })
            .map(|&group| self.groups[group].as_slice())
    }

    /// Get the keys mapping to `value`, if any.
    ///
    /// Time: O(1) to find the keys
    pub fn get<BV>(&self, value: &BV) -> KeysOf<'_, K, V>
    where
        BV: Hash + Eq + ?Sized,
        V: Borrow<BV>,
    {
        KeysOf {
            entries: self.table.entries(),
            positions: self.group(value).unwrap_or(&[]).iter(),
        }
    }

    /// Test whether any key maps to `value`.
    #[must_use]
    pub fn contains_value<BV>(&self, value: &BV) -> bool
    where
        BV: Hash + Eq + ?Sized,
        V: Borrow<BV>,
    {
        self.group(value).is_some()
    }
}

impl<K, V, S, P: SharedPointerKind> Inverse<K, V, S, P> {
    /// Get the number of distinct values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Get the number of key/value pairs, the same as in the map.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.table.len()
    }

    /// Test whether the inverse is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Get an iterator over each distinct value with the keys mapping
    /// to it.
    pub fn iter(&self) -> InverseIter<'_, K, V> {
        InverseIter {
            entries: self.table.entries(),
            groups: self.groups.iter(),
        }
    }
}

impl<K, V, S, P: SharedPointerKind> Clone for Inverse<K, V, S, P> {
    fn clone(&self) -> Self {
        Inverse {
            table: self.table.clone(),
            groups: self.groups.clone(),
            index: self.index.clone(),
            state: self.state.clone(),
        }
    }
}

impl<K: Debug, V: Debug, S, P: SharedPointerKind> Debug for Inverse<K, V, S, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut map = f.debug_map();
        for (value, keys) in self.iter() {
            map.entry(value, &keys.collect::<Vec<_>>());
        }
        map.finish()
    }
}

/// An iterator over the keys mapping to one value.
pub struct KeysOf<'a, K, V> {
    entries: &'a [Entry<K, V>],
    positions: slice::Iter<'a, usize>,
}

impl<'a, K, V> Iterator for KeysOf<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.positions.next().map(|&pos| entries[pos].key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<K, V> ExactSizeIterator for KeysOf<'_, K, V> {}

impl<K, V> FusedIterator for KeysOf<'_, K, V> {}

/// An iterator over the values of an [`Inverse`], each with its keys.
pub struct InverseIter<'a, K, V> {
    entries: &'a [Entry<K, V>],
    groups: slice::Iter<'a, Vec<usize>>,
}

impl<'a, K, V> Iterator for InverseIter<'a, K, V> {
    type Item = (&'a V, KeysOf<'a, K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        self.groups.next().map(|group| {
            let keys = KeysOf {
                entries,
                positions: group.iter(),
            };
            (entries[group[0]].value(), keys)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

impl<K, V> ExactSizeIterator for InverseIter<'_, K, V> {}

impl<K, V> FusedIterator for InverseIter<'_, K, V> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{frozenmap, Builder, FrozenMap};
    use std::thread;

    #[test]
    fn one_value_per_key() {
        let map: FrozenMap<&str, i32> = frozenmap! {"x" => 1, "y" => 2}.unwrap();
        let multimap = map.as_multimap();
        assert_eq!(2, multimap.len());
        assert_eq!(2, multimap.size());
        assert_eq!(&[1], multimap.get("x"));
        assert_eq!(&[] as &[i32], multimap.get("q"));
        assert!(multimap.contains_key("y"));
        assert!(multimap.contains_entry("y", &2));
        assert!(!multimap.contains_entry("y", &1));
        assert_eq!(
            vec![(&"x", &[1][..]), (&"y", &[2][..])],
            multimap.iter().collect::<Vec<_>>()
        );
        assert_eq!(r#"{"x": [1], "y": [2]}"#, format!("{:?}", multimap));
    }

    #[test]
    fn inverse_groups_keys_by_value() {
        let map: FrozenMap<char, u8> = "abcabd"
            .chars()
            .enumerate()
            .map(|(i, c)| (c, (i % 3) as u8))
            .collect();
        // keep-last leaves a=0, b=1, c=2, d=2
        let inverse = map.as_multimap().inverse();
        assert_eq!(3, inverse.len());
        assert_eq!(4, inverse.size());
        assert_eq!(vec![&'c', &'d'], inverse.get(&2).collect::<Vec<_>>());
        assert_eq!(0, inverse.get(&9).count());
        assert!(inverse.contains_value(&0));
        assert_eq!(
            vec![(&0, vec![&'a']), (&1, vec![&'b']), (&2, vec![&'c', &'d'])],
            inverse
                .iter()
                .map(|(v, keys)| (v, keys.collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn inverse_is_computed_once() {
        let mut builder = Builder::new();
        builder.put_all((0..1000).map(|i| (i, i % 7)));
        let map = builder.build_or_throw().unwrap();
        let multimap = map.as_multimap();
        let seen: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| map.as_multimap().inverse() as *const _ as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let expected = multimap.inverse() as *const _ as usize;
        assert!(seen.iter().all(|&ptr| ptr == expected));
        assert_eq!(7, multimap.inverse().len());
    }
}
