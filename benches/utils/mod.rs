#![allow(dead_code)]
use rand::seq::SliceRandom;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

// Distinct, reproducible keys and values
pub trait TestData: Clone + Debug + Ord + Eq + Hash + Send + Sync {
    fn generate(size: usize) -> Vec<Self>;
}

fn distinct<A: Ord>(size: usize, mut next: impl FnMut(&mut SmallRng) -> A) -> Vec<A> {
    let mut gen = SmallRng::seed_from_u64(1);
    let mut set = BTreeSet::new();
    while set.len() < size {
        set.insert(next(&mut gen));
    }
    set.into_iter().collect()
}

impl TestData for i64 {
    fn generate(size: usize) -> Vec<Self> {
        distinct(size, |gen| gen.random::<i64>())
    }
}

impl TestData for String {
    fn generate(size: usize) -> Vec<Self> {
        distinct(size, |gen| {
            let len = gen.random_range(5..20);
            (0..len)
                .map(|_| gen.random_range(b'a'..=b'z') as char)
                .collect()
        })
    }
}

impl<T> TestData for Arc<T>
where
    T: TestData + 'static,
{
    fn generate(size: usize) -> Vec<Self> {
        T::generate(size).into_iter().map(Arc::new).collect()
    }
}

pub fn reorder<A: Clone>(vec: &[A]) -> Vec<A> {
    let mut gen = SmallRng::seed_from_u64(1);
    let mut out = vec.to_vec();
    out.shuffle(&mut gen);
    out
}

/// Pairs in which roughly one key in `every` turns up a second time, with
/// a different value, somewhere later on.
pub fn with_repeats<K: Clone, V: Clone>(keys: &[K], values: &[V], every: usize) -> Vec<(K, V)> {
    let mut gen = SmallRng::seed_from_u64(2);
    let mut out: Vec<(K, V)> = keys.iter().cloned().zip(values.iter().cloned()).collect();
    for (i, key) in keys.iter().enumerate().step_by(every.max(1)) {
        let at = gen.random_range(i..=out.len());
        out.insert(at, (key.clone(), values[values.len() - 1 - i].clone()));
    }
    out
}
