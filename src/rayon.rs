// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parallel iterators.
//!
//! These are only available when using the `rayon` feature flag.
//!
//! Collecting in parallel keeps the order of the source iterator, so a
//! builder or map collected from a parallel iterator comes out exactly as
//! its sequential counterpart would.

use std::hash::{BuildHasher, Hash};

use ::rayon::iter::{
    FromParallelIterator, IndexedParallelIterator, IntoParallelIterator,
    IntoParallelRefIterator, ParallelExtend, ParallelIterator,
};
use ::rayon::slice;

use crate::frozen::builder::GenericBuilder;
use crate::frozen::entry::Entry;
use crate::frozen::map::GenericFrozenMap;
use crate::shared_ptr::SharedPointerKind;

impl<'a, K, V, S, P> IntoParallelRefIterator<'a> for GenericFrozenMap<K, V, S, P>
where
    K: Sync + 'a,
    V: Sync + 'a,
    P: SharedPointerKind,
{
    type Item = (&'a K, &'a V);
    type Iter = ParIter<'a, K, V>;

    fn par_iter(&'a self) -> Self::Iter {
        ParIter {
            it: self.entries().par_iter(),
        }
    }
}

/// A parallel iterator over the pairs of a [`FrozenMap`][crate::FrozenMap].
pub struct ParIter<'a, K, V> {
    it: slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> ParallelIterator for ParIter<'a, K, V>
where
    K: Sync + 'a,
    V: Sync + 'a,
{
    type Item = (&'a K, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: ::rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        self.it.map(Entry::as_pair).drive_unindexed(consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.it.len())
    }
}

impl<'a, K, V> IndexedParallelIterator for ParIter<'a, K, V>
where
    K: Sync + 'a,
    V: Sync + 'a,
{
    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: ::rayon::iter::plumbing::Consumer<Self::Item>,
    {
        self.it.map(Entry::as_pair).drive(consumer)
    }

    fn len(&self) -> usize {
        self.it.len()
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: ::rayon::iter::plumbing::ProducerCallback<Self::Item>,
    {
        self.it.map(Entry::as_pair).with_producer(callback)
    }
}

impl<K, V, S, P> FromParallelIterator<(K, V)> for GenericBuilder<K, V, S, P>
where
    K: Clone + Send,
    V: Clone + Send,
    S: Default,
    P: SharedPointerKind,
    GenericBuilder<K, V, S, P>: Send,
{
    /// Collect pairs into a builder in parallel. Each split gets its own
    /// builder, and neighbouring builders are combined in order.
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        par_iter
            .into_par_iter()
            .fold(Self::default, |mut builder, (key, value)| {
                builder.put(key, value);
                builder
            })
            .reduce(Self::default, |mut left, right| {
                left.combine(right);
                left
            })
    }
}

impl<K, V, S, P> ParallelExtend<(K, V)> for GenericBuilder<K, V, S, P>
where
    K: Clone + Send,
    V: Clone + Send,
    S: Default,
    P: SharedPointerKind,
    GenericBuilder<K, V, S, P>: Send,
{
    fn par_extend<I>(&mut self, par_iter: I)
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        self.combine(Self::from_par_iter(par_iter));
    }
}

impl<K, V, S, P> FromParallelIterator<(K, V)> for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
    GenericBuilder<K, V, S, P>: Send,
{
    /// Collect pairs into a map in parallel. Where a key repeats, the last
    /// value wins, as with [`FromIterator`].
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = (K, V)>,
    {
        GenericBuilder::from_par_iter(par_iter).into_map_keeping_last()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{frozenmap, Builder, FrozenMap};
    use ::proptest::collection::vec;
    use ::proptest::num::i16;
    use ::proptest::proptest;

    #[test]
    fn par_iter_follows_iteration_order() {
        let map: FrozenMap<&str, i32> = frozenmap! {"c" => 3, "a" => 1, "b" => 2}.unwrap();
        let collected: Vec<_> = map.par_iter().collect();
        assert_eq!(map.iter().collect::<Vec<_>>(), collected);
        assert_eq!(6, map.par_iter().map(|(_, v)| *v).sum::<i32>());
    }

    #[test]
    fn par_extend_appends_after_existing_entries() {
        let mut builder = Builder::new();
        builder.put(0, 0);
        builder.par_extend((1..100).into_par_iter().map(|i| (i, i * 2)));
        let map = builder.build_or_throw().unwrap();
        assert_eq!(100, map.len());
        assert_eq!((0..100).collect::<Vec<_>>(), map.keys().copied().collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn collect_in_parallel(ref pairs in vec((i16::ANY, i16::ANY), 0..500)) {
            let sequential: FrozenMap<i16, i16> = pairs.iter().copied().collect();
            let parallel: FrozenMap<i16, i16> = pairs.clone().into_par_iter().collect();
            assert_eq!(sequential, parallel);
            assert_eq!(
                sequential.iter().collect::<Vec<_>>(),
                parallel.iter().collect::<Vec<_>>()
            );
        }
    }
}
