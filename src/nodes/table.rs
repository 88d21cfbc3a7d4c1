// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning a builder's entries into a finished, indexed table.
//!
//! Construction places every entry into a [`ChainIndex`] sized for the
//! entry count. Should any chain grow past the index's chain limit, which
//! starts at [`MAX_BUCKET_LEN`][crate::config::MAX_BUCKET_LEN] and widens
//! slowly with the table size, the map's hasher is
//! considered compromised for this input, and construction starts over
//! from the untouched entries with a [`KeyedIndex`] instead.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::hash::{BuildHasher, Hash};
use std::mem;

use archery::{SharedPointer, SharedPointerKind};
use tracing::{debug, trace};

use crate::error::Error;
use crate::frozen::entry::Entry;
use crate::nodes::chain::ChainIndex;
use crate::nodes::keyed::KeyedIndex;
use crate::util::clone_ref;

/// Marks an empty bucket, the end of a chain, or a dropped position.
pub(crate) const VACANT: usize = usize::MAX;

/// A chain outgrew its index's chain limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Flooded;

/// An index of positions into an entry array, as it's being built.
pub(crate) trait Slots {
    /// Index the entry at `pos`, unless an entry with an equal key has
    /// been indexed before, in which case its position is returned and
    /// nothing changes.
    fn claim<K: Hash + Eq, V>(
        &mut self,
        entries: &[Entry<K, V>],
        pos: usize,
    ) -> Result<Option<usize>, Flooded>;

    /// Move every indexed position `old` to `positions[old]`.
    fn renumber(&mut self, positions: &[usize]);
}

/// What to do about repeated keys.
pub(crate) enum DuplicatePolicy<'a, K, V> {
    /// Fail with [`Error::DuplicateKey`].
    Reject,
    /// The last value wins, at the position of the first occurrence.
    KeepLast,
    /// The values are folded together in the order they were put, as
    /// `merge(key, earlier, later)`, at the position of the first
    /// occurrence.
    Merge(&'a mut dyn FnMut(&K, V, V) -> V),
}

impl<K, V> DuplicatePolicy<'_, K, V> {
    fn rejects(&self) -> bool {
        matches!(self, DuplicatePolicy::Reject)
    }
}

pub(crate) type ValueOrder<V> = dyn Fn(&V, &V) -> Ordering + Send + Sync;

/// The entries handed to construction.
///
/// A shared arena is still referenced by its builder and is only copied
/// if construction has to remove or reorder entries. An owned arena is
/// used in place.
pub(crate) enum Arena<K, V, P: SharedPointerKind> {
    Shared(SharedPointer<Vec<Entry<K, V>>, P>),
    Owned(Vec<Entry<K, V>>),
}

impl<K, V, P: SharedPointerKind> Arena<K, V, P> {
    fn as_slice(&self) -> &[Entry<K, V>] {
        match self {
            Arena::Shared(entries) => entries,
            Arena::Owned(entries) => entries,
        }
    }

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn into_shared(self) -> SharedPointer<Vec<Entry<K, V>>, P> {
        match self {
            Arena::Shared(entries) => entries,
            Arena::Owned(entries) => SharedPointer::new(entries),
        }
    }
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Arena<K, V, P> {
    fn into_owned(self) -> Vec<Entry<K, V>> {
        match self {
            Arena::Shared(entries) => clone_ref(entries),
            Arena::Owned(entries) => entries,
        }
    }
}

pub(crate) enum Layout<K, V, P: SharedPointerKind> {
    Empty,
    Singleton(Entry<K, V>),
    FlatArray {
        entries: SharedPointer<Vec<Entry<K, V>>, P>,
        index: ChainIndex,
    },
    HashBacked {
        entries: SharedPointer<Vec<Entry<K, V>>, P>,
        index: KeyedIndex,
    },
}

impl<K: Clone, V: Clone, P: SharedPointerKind> Layout<K, V, P> {
    fn small(arena: Arena<K, V, P>) -> Self {
        match arena.into_owned().pop() {
            Some(entry) => Layout::Singleton(entry),
            None => Layout::Empty,
        }
    }

    fn flat_array(entries: SharedPointer<Vec<Entry<K, V>>, P>, index: ChainIndex) -> Self {
        if entries.len() < 2 {
            Layout::small(Arena::Shared(entries))
        } else {
            Layout::FlatArray { entries, index }
        }
    }

    fn hash_backed(entries: SharedPointer<Vec<Entry<K, V>>, P>, index: KeyedIndex) -> Self {
        if entries.len() < 2 {
            Layout::small(Arena::Shared(entries))
        } else {
            Layout::HashBacked { entries, index }
        }
    }
}

/// The immutable core of a map: its entries in iteration order, the
/// index over them, and the hasher the index was built with.
pub(crate) struct Table<K, V, S, P: SharedPointerKind> {
    layout: Layout<K, V, P>,
    hasher: S,
}

impl<K, V, S, P: SharedPointerKind> Table<K, V, S, P> {
    pub(crate) fn empty(hasher: S) -> Self {
        Table {
            layout: Layout::Empty,
            hasher,
        }
    }

    pub(crate) fn singleton(entry: Entry<K, V>, hasher: S) -> Self {
        Table {
            layout: Layout::Singleton(entry),
            hasher,
        }
    }

    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        match &self.layout {
            Layout::Empty => &[],
            Layout::Singleton(entry) => std::slice::from_ref(entry),
            Layout::FlatArray { entries, .. } | Layout::HashBacked { entries, .. } => entries,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    pub(crate) fn hasher(&self) -> &S {
        &self.hasher
    }

    #[cfg(test)]
    pub(crate) fn is_hash_backed(&self) -> bool {
        matches!(self.layout, Layout::HashBacked { .. })
    }

    /// Find the position of the entry for `key`.
    pub(crate) fn position<BK>(&self, key: &BK) -> Option<usize>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
        S: BuildHasher,
    {
        match &self.layout {
            Layout::Empty => None,
            Layout::Singleton(entry) => (entry.key().borrow() == key).then_some(0),
            Layout::FlatArray { entries, index } => index.position(&self.hasher, entries, key),
            Layout::HashBacked { entries, index } => index.position(entries, key),
        }
    }

    pub(crate) fn get<BK>(&self, key: &BK) -> Option<&Entry<K, V>>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
        S: BuildHasher,
    {
        self.position(key).map(|pos| &self.entries()[pos])
    }
}

impl<K, V, S, P> Table<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Index `arena` under `policy`, sorting it by value first if an
    /// `order` is given.
    ///
    /// When sorting, repeated keys are resolved on the unsorted entries,
    /// with [`DuplicatePolicy::KeepLast`] keeping each key's last
    /// occurrence where it stands and [`DuplicatePolicy::Merge`] folding
    /// into the first. Ties in `order` keep their relative order.
    pub(crate) fn construct(
        arena: Arena<K, V, P>,
        policy: DuplicatePolicy<'_, K, V>,
        order: Option<&ValueOrder<V>>,
        hasher: S,
    ) -> Result<Self, Error> {
        let (arena, policy) = match order {
            Some(order) if arena.len() > 1 => {
                let mut entries = arena.into_owned();
                keep_distinct(&mut entries, policy)?;
                entries.sort_by(|left, right| order(left.value(), right.value()));
                (Arena::Owned(entries), DuplicatePolicy::Reject)
            }
            _ => (arena, policy),
        };
        if arena.len() < 2 {
            return Ok(Table {
                layout: Layout::small(arena),
                hasher,
            });
        }
        let mut slots = ChainIndex::slots(arena.len(), &hasher);
        let layout = match place(&mut slots, arena.as_slice(), policy.rejects()) {
            Ok(overrides) => {
                let entries = settle(arena, &overrides, &mut slots, policy);
                Layout::flat_array(entries, slots.into_index())
            }
            Err(Conflict::Duplicate { first, second }) => {
                return Err(Error::DuplicateKey { first, second })
            }
            Err(Conflict::Flooded) => {
                debug!(
                    len = arena.len(),
                    max_chain_len = slots.max_chain_len(),
                    "hash chain overflow, rebuilding with a keyed index"
                );
                hash_backed(arena, policy)?
            }
        };
        Ok(Table { layout, hasher })
    }

    /// Index `arena` with a [`KeyedIndex`] from the start.
    pub(crate) fn construct_hash_backed(
        arena: Arena<K, V, P>,
        policy: DuplicatePolicy<'_, K, V>,
        hasher: S,
    ) -> Result<Self, Error> {
        let layout = if arena.len() < 2 {
            Layout::small(arena)
        } else {
            hash_backed(arena, policy)?
        };
        Ok(Table { layout, hasher })
    }
}

impl<K: Clone, V: Clone, S, P: SharedPointerKind> Table<K, V, S, P> {
    pub(crate) fn into_entries(self) -> Vec<Entry<K, V>> {
        match self.layout {
            Layout::Empty => Vec::new(),
            Layout::Singleton(entry) => vec![entry],
            Layout::FlatArray { entries, .. } | Layout::HashBacked { entries, .. } => {
                clone_ref(entries)
            }
        }
    }
}

enum Conflict {
    Duplicate { first: usize, second: usize },
    Flooded,
}

/// Claim a slot for every entry in order. Unless rejecting, returns the
/// `(first, later)` positions of every repeated key, ordered by `later`.
fn place<I, K, V>(
    slots: &mut I,
    entries: &[Entry<K, V>],
    reject: bool,
) -> Result<Vec<(usize, usize)>, Conflict>
where
    I: Slots,
    K: Hash + Eq,
{
    let mut overrides = Vec::new();
    for pos in 0..entries.len() {
        match slots.claim(entries, pos) {
            Ok(None) => {}
            Ok(Some(first)) if reject => {
                return Err(Conflict::Duplicate { first, second: pos })
            }
            Ok(Some(first)) => overrides.push((first, pos)),
            Err(Flooded) => return Err(Conflict::Flooded),
        }
    }
    Ok(overrides)
}

/// Fold each repeated key's values into its first position, then drop
/// the later occurrences and renumber the index to match.
fn settle<K, V, P, I>(
    arena: Arena<K, V, P>,
    overrides: &[(usize, usize)],
    slots: &mut I,
    policy: DuplicatePolicy<'_, K, V>,
) -> SharedPointer<Vec<Entry<K, V>>, P>
where
    K: Clone,
    V: Clone,
    P: SharedPointerKind,
    I: Slots,
{
    if overrides.is_empty() {
        return arena.into_shared();
    }
    trace!(
        superseded = overrides.len(),
        "resolving the values of repeated keys"
    );
    let len = arena.len();
    let entries = fold_repeats(arena.into_owned(), overrides, policy);
    let mut superseded = vec![false; len];
    for &(_, later) in overrides {
        superseded[later] = true;
    }
    let mut next = 0;
    let positions: Vec<usize> = superseded
        .iter()
        .map(|&gone| {
            if gone {
                VACANT
            } else {
                next += 1;
                next - 1
            }
        })
        .collect();
    slots.renumber(&positions);
    SharedPointer::new(entries)
}

/// Combine the value at each `later` position into the one at its `first`
/// position, in the order given, and drop the `later` entries.
fn fold_repeats<K, V>(
    entries: Vec<Entry<K, V>>,
    overrides: &[(usize, usize)],
    policy: DuplicatePolicy<'_, K, V>,
) -> Vec<Entry<K, V>> {
    let mut keep_last = |_: &K, _: V, later: V| later;
    let merge: &mut dyn FnMut(&K, V, V) -> V = match policy {
        DuplicatePolicy::Merge(merge) => merge,
        DuplicatePolicy::Reject | DuplicatePolicy::KeepLast => &mut keep_last,
    };
    let (keys, values): (Vec<K>, Vec<V>) = entries.into_iter().map(Entry::into_pair).unzip();
    let mut values: Vec<Option<V>> = values.into_iter().map(Some).collect();
    for &(first, later) in overrides {
        if let (Some(earlier), Some(value)) = (values[first].take(), values[later].take()) {
            values[first] = Some(merge(&keys[first], earlier, value));
        }
    }
    keys.into_iter()
        .zip(values)
        .filter_map(|(key, value)| value.map(|value| Entry::new(key, value)))
        .collect()
}

fn hash_backed<K, V, P>(
    arena: Arena<K, V, P>,
    policy: DuplicatePolicy<'_, K, V>,
) -> Result<Layout<K, V, P>, Error>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let mut index = KeyedIndex::with_capacity(arena.len());
    match place(&mut index, arena.as_slice(), policy.rejects()) {
        Ok(overrides) => {
            let entries = settle(arena, &overrides, &mut index, policy);
            Ok(Layout::hash_backed(entries, index))
        }
        Err(Conflict::Duplicate { first, second }) => Err(Error::DuplicateKey { first, second }),
        Err(Conflict::Flooded) => unreachable!("keyed index has no chains to flood"),
    }
}

/// Resolve repeated keys without regard to position, ahead of sorting.
fn keep_distinct<K: Hash + Eq, V>(
    entries: &mut Vec<Entry<K, V>>,
    policy: DuplicatePolicy<'_, K, V>,
) -> Result<(), Error> {
    let mut index = KeyedIndex::with_capacity(entries.len());
    match policy {
        DuplicatePolicy::Reject => {
            for pos in 0..entries.len() {
                if let Ok(Some(first)) = index.claim(&entries[..], pos) {
                    return Err(Error::DuplicateKey { first, second: pos });
                }
            }
        }
        DuplicatePolicy::KeepLast => {
            let mut superseded = vec![false; entries.len()];
            for pos in (0..entries.len()).rev() {
                superseded[pos] = matches!(index.claim(&entries[..], pos), Ok(Some(_)));
            }
            drop_marked(entries, &superseded);
        }
        merging @ DuplicatePolicy::Merge(_) => {
            let overrides: Vec<(usize, usize)> = (0..entries.len())
                .filter_map(|pos| match index.claim(&entries[..], pos) {
                    Ok(Some(first)) => Some((first, pos)),
                    _ => None,
                })
                .collect();
            if !overrides.is_empty() {
                *entries = fold_repeats(mem::take(entries), &overrides, merging);
            }
        }
    }
    Ok(())
}

fn drop_marked<A>(items: &mut Vec<A>, marked: &[bool]) {
    let mut pos = 0;
    items.retain(|_| {
        let keep = !marked[pos];
        pos += 1;
        keep
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared_ptr::DefaultSharedPtr;
    use crate::test::LolHasher;
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasherDefault;

    type TestTable<S> = Table<i32, i32, S, DefaultSharedPtr>;

    fn owned(pairs: &[(i32, i32)]) -> Arena<i32, i32, DefaultSharedPtr> {
        Arena::Owned(pairs.iter().copied().map(Entry::from).collect())
    }

    fn pairs<S>(table: &TestTable<S>) -> Vec<(i32, i32)> {
        table.entries().iter().map(|e| (*e.key(), *e.value())).collect()
    }

    #[test]
    fn small_layouts() {
        let empty: TestTable<_> =
            Table::construct(owned(&[]), DuplicatePolicy::Reject, None, RandomState::new())
                .unwrap();
        assert!(matches!(empty.layout, Layout::Empty));
        let single: TestTable<_> = Table::construct(
            owned(&[(1, 2)]),
            DuplicatePolicy::Reject,
            None,
            RandomState::new(),
        )
        .unwrap();
        assert!(matches!(single.layout, Layout::Singleton(_)));
        assert_eq!(Some(0), single.position(&1));
    }

    #[test]
    fn reject_names_both_positions() {
        let result: Result<TestTable<_>, _> = Table::construct(
            owned(&[(1, 1), (2, 2), (3, 3), (2, 4)]),
            DuplicatePolicy::Reject,
            None,
            RandomState::new(),
        );
        assert_eq!(
            Some(Error::DuplicateKey {
                first: 1,
                second: 3
            }),
            result.err()
        );
    }

    #[test]
    fn keep_last_keeps_first_position() {
        let table: TestTable<_> = Table::construct(
            owned(&[(1, 1), (2, 2), (1, 3), (3, 4), (1, 5), (2, 6)]),
            DuplicatePolicy::KeepLast,
            None,
            RandomState::new(),
        )
        .unwrap();
        assert_eq!(vec![(1, 5), (2, 6), (3, 4)], pairs(&table));
        for (pos, key) in [1, 2, 3].iter().enumerate() {
            assert_eq!(Some(pos), table.position(key));
        }
    }

    #[test]
    fn keep_last_can_collapse_to_singleton() {
        let table: TestTable<_> = Table::construct(
            owned(&[(7, 1), (7, 2)]),
            DuplicatePolicy::KeepLast,
            None,
            RandomState::new(),
        )
        .unwrap();
        assert!(matches!(table.layout, Layout::Singleton(_)));
        assert_eq!(Some(&Entry::new(7, 2)), table.get(&7));
    }

    #[test]
    fn value_order_is_stable() {
        let by_value = |a: &i32, b: &i32| a.cmp(b);
        let table: TestTable<_> = Table::construct(
            owned(&[(1, 30), (2, 10), (3, 20), (4, 10)]),
            DuplicatePolicy::Reject,
            Some(&by_value),
            RandomState::new(),
        )
        .unwrap();
        assert_eq!(vec![(2, 10), (4, 10), (3, 20), (1, 30)], pairs(&table));
        assert_eq!(Some(3), table.position(&1));
    }

    #[test]
    fn value_order_keeps_last_occurrence_in_place() {
        let by_value = |a: &i32, b: &i32| a.cmp(b);
        let table: TestTable<_> = Table::construct(
            owned(&[(1, 5), (2, 5), (1, 5), (3, 1)]),
            DuplicatePolicy::KeepLast,
            Some(&by_value),
            RandomState::new(),
        )
        .unwrap();
        // Key 1 now sits after key 2, where its last occurrence was.
        assert_eq!(vec![(3, 1), (2, 5), (1, 5)], pairs(&table));
    }

    #[test]
    fn value_order_rejects_in_insertion_positions() {
        let by_value = |a: &i32, b: &i32| b.cmp(a);
        let result: Result<TestTable<_>, _> = Table::construct(
            owned(&[(1, 1), (2, 2), (1, 3)]),
            DuplicatePolicy::Reject,
            Some(&by_value),
            RandomState::new(),
        );
        assert_eq!(
            Some(Error::DuplicateKey {
                first: 0,
                second: 2
            }),
            result.err()
        );
    }

    #[test]
    fn untouched_shared_arena_is_not_copied() {
        let shared: SharedPointer<Vec<Entry<i32, i32>>, DefaultSharedPtr> =
            SharedPointer::new((0..100).map(|i| Entry::new(i, i)).collect());
        let table: TestTable<_> = Table::construct(
            Arena::Shared(shared.clone()),
            DuplicatePolicy::KeepLast,
            None,
            RandomState::new(),
        )
        .unwrap();
        match &table.layout {
            Layout::FlatArray { entries, .. } => assert!(SharedPointer::ptr_eq(entries, &shared)),
            _ => panic!("expected a flat array layout"),
        }
    }

    #[test]
    fn colliding_hashes_fall_back() {
        let hasher = BuildHasherDefault::<LolHasher<4>>::default();
        let mut input: Vec<(i32, i32)> = (0..500).map(|i| (i, i * 10)).collect();
        input.push((250, -1));
        let table: TestTable<_> =
            Table::construct(owned(&input), DuplicatePolicy::KeepLast, None, hasher).unwrap();
        assert!(table.is_hash_backed());
        assert_eq!(500, table.len());
        assert_eq!(Some(&Entry::new(250, -1)), table.get(&250));
        for i in 0..500 {
            assert_eq!(Some(i as usize), table.position(&i));
        }
        assert_eq!(None, table.position(&500));

        let rejected: Result<TestTable<_>, _> = Table::construct(
            owned(&input),
            DuplicatePolicy::Reject,
            None,
            BuildHasherDefault::<LolHasher<4>>::default(),
        );
        assert_eq!(
            Some(Error::DuplicateKey {
                first: 250,
                second: 500
            }),
            rejected.err()
        );
    }

    #[test]
    fn forced_hash_backed_layout() {
        let table: TestTable<_> = Table::construct_hash_backed(
            owned(&[(1, 1), (2, 2), (1, 3)]),
            DuplicatePolicy::KeepLast,
            RandomState::new(),
        )
        .unwrap();
        assert!(table.is_hash_backed());
        assert_eq!(vec![(1, 3), (2, 2)], pairs(&table));
    }

    #[test]
    fn merge_folds_in_insertion_order() {
        let mut calls = Vec::new();
        let mut merge = |key: &i32, earlier: i32, later: i32| {
            calls.push((*key, earlier, later));
            earlier * 10 + later
        };
        let table: TestTable<_> = Table::construct(
            owned(&[(1, 1), (2, 2), (1, 3), (3, 4), (1, 5)]),
            DuplicatePolicy::Merge(&mut merge),
            None,
            RandomState::new(),
        )
        .unwrap();
        assert_eq!(vec![(1, 135), (2, 2), (3, 4)], pairs(&table));
        assert_eq!(Some(0), table.position(&1));
        assert_eq!(Some(2), table.position(&3));
        assert_eq!(vec![(1, 1, 3), (1, 13, 5)], calls);
    }

    #[test]
    fn merge_survives_fallback() {
        let mut input: Vec<(i32, i32)> = (0..500).map(|i| (i, 1)).collect();
        input.extend((0..500).step_by(7).map(|i| (i, 2)));
        input.push((0, 4));
        let mut sum = |_: &i32, a: i32, b: i32| a + b;
        let table: TestTable<_> = Table::construct(
            owned(&input),
            DuplicatePolicy::Merge(&mut sum),
            None,
            BuildHasherDefault::<LolHasher<4>>::default(),
        )
        .unwrap();
        assert!(table.is_hash_backed());
        assert_eq!(500, table.len());
        assert_eq!(Some(&Entry::new(0, 7)), table.get(&0));
        assert_eq!(Some(&Entry::new(7, 3)), table.get(&7));
        assert_eq!(Some(&Entry::new(8, 1)), table.get(&8));
        for i in 0..500 {
            assert_eq!(Some(i as usize), table.position(&i));
        }
    }

    #[test]
    fn merge_before_value_order() {
        let by_value = |a: &i32, b: &i32| a.cmp(b);
        let mut concat = |_: &i32, a: i32, b: i32| a * 10 + b;
        let table: TestTable<_> = Table::construct(
            owned(&[(1, 9), (2, 5), (1, 1), (3, 7), (1, 2)]),
            DuplicatePolicy::Merge(&mut concat),
            Some(&by_value),
            RandomState::new(),
        )
        .unwrap();
        assert_eq!(vec![(2, 5), (3, 7), (1, 912)], pairs(&table));
        assert_eq!(Some(2), table.position(&1));
    }
}
