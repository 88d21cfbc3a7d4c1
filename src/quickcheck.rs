use crate::{shared_ptr::SharedPointerKind, Entry, GenericBuilder, GenericFrozenMap};
use ::quickcheck::{Arbitrary, Gen};
use std::hash::{BuildHasher, Hash};
use std::iter::FromIterator;

impl<K: Arbitrary, V: Arbitrary> Arbitrary for Entry<K, V> {
    fn arbitrary(g: &mut Gen) -> Self {
        Entry::from(<(K, V)>::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.clone().into_pair().shrink().map(Entry::from))
    }
}

impl<K, V, S, P> Arbitrary for GenericBuilder<K, V, S, P>
where
    K: Arbitrary + Sync,
    V: Arbitrary + Sync,
    S: Default + Clone + Send + Sync + 'static,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericBuilder::from_iter(Vec::<(K, V)>::arbitrary(g))
    }
}

impl<K, V, S, P> Arbitrary for GenericFrozenMap<K, V, S, P>
where
    K: Hash + Eq + Arbitrary + Sync,
    V: Arbitrary + Sync,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericFrozenMap::from_iter(Vec::<(K, V)>::arbitrary(g))
    }
}
