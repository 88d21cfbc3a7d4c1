// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fallible mutation interface shared by mutable and frozen maps.
//!
//! Code written against [`MutableMap`] can be handed a standard library
//! map, whose mutators always succeed, or a
//! [`FrozenMap`][crate::FrozenMap], whose mutators always fail with
//! [`Error::UnsupportedMutation`] and leave the map untouched.
//!
//! # Examples
//!
//! ```
//! # use frozenmap::{frozenmap, Error, FrozenMap, MutableMap};
//! # use std::collections::HashMap;
//! fn bump<M: MutableMap<&'static str, i32>>(map: &mut M) -> Result<(), Error> {
//!     map.try_merge("hits", 1, |old, new| Some(old + new))
//! }
//!
//! let mut counts = HashMap::new();
//! bump(&mut counts)?;
//! bump(&mut counts)?;
//! assert_eq!(Some(&2), counts.get("hits"));
//!
//! let mut frozen: FrozenMap<&str, i32> = frozenmap! {"hits" => 0}?;
//! assert_eq!(
//!     Err(Error::UnsupportedMutation { operation: "merge" }),
//!     bump(&mut frozen)
//! );
//! assert_eq!(Some(&0), frozen.get("hits"));
//! # Ok::<(), Error>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::mem;

use archery::SharedPointerKind;

use crate::error::Error;
use crate::frozen::map::GenericFrozenMap;

/// Mutating operations on a map, each of which may be refused.
pub trait MutableMap<K, V> {
    /// Map `key` to `value`, returning the value it replaced.
    fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error>;

    /// Map `key` to `value` unless `key` is already present. Returns
    /// whether the mapping was added.
    fn try_insert_if_absent(&mut self, key: K, value: V) -> Result<bool, Error>;

    /// Replace the value of `key` if it's present, returning the old value.
    fn try_replace(&mut self, key: &K, value: V) -> Result<Option<V>, Error>;

    /// Remove `key`, returning its value.
    fn try_remove(&mut self, key: &K) -> Result<Option<V>, Error>;

    /// Remove every mapping.
    fn try_clear(&mut self) -> Result<(), Error>;

    /// Map `key` to `value` if it's absent, otherwise to the result of
    /// `merge` on the old and the new value. `None` from `merge` removes
    /// the key.
    fn try_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<(), Error>
    where
        F: FnOnce(V, V) -> Option<V>;

    /// Map `key` to the result of `compute` on its current value, or
    /// remove it if that's `None`.
    fn try_compute<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>;

    /// Map `key` to the result of `compute` if it's absent.
    fn try_compute_if_absent<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K) -> V;

    /// Map `key`, if present, to the result of `compute` on its value, or
    /// remove it if that's `None`.
    fn try_compute_if_present<F>(&mut self, key: &K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, V) -> Option<V>;

    /// Replace every value with the result of `replace` on its mapping.
    fn try_replace_all<F>(&mut self, replace: F) -> Result<(), Error>
    where
        F: FnMut(&K, &V) -> V;

    /// Map every key from an iterator to its value, in order.
    fn try_extend<I>(&mut self, pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>;
}

impl<K, V, S> MutableMap<K, V> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        Ok(self.insert(key, value))
    }

    fn try_insert_if_absent(&mut self, key: K, value: V) -> Result<bool, Error> {
        if self.contains_key(&key) {
            return Ok(false);
        }
        self.insert(key, value);
        Ok(true)
    }

    fn try_replace(&mut self, key: &K, value: V) -> Result<Option<V>, Error> {
        Ok(self.get_mut(key).map(|slot| mem::replace(slot, value)))
    }

    fn try_remove(&mut self, key: &K) -> Result<Option<V>, Error> {
        Ok(self.remove(key))
    }

    fn try_clear(&mut self) -> Result<(), Error> {
        self.clear();
        Ok(())
    }

    fn try_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<(), Error>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        let merged = match self.remove(&key) {
            None => Some(value),
            Some(old) => merge(old, value),
        };
        if let Some(merged) = merged {
            self.insert(key, merged);
        }
        Ok(())
    }

    fn try_compute<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>,
    {
        let old = self.remove(&key);
        if let Some(new) = compute(&key, old) {
            self.insert(key, new);
        }
        Ok(())
    }

    fn try_compute_if_absent<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K) -> V,
    {
        self.entry(key).or_insert_with_key(compute);
        Ok(())
    }

    fn try_compute_if_present<F>(&mut self, key: &K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, V) -> Option<V>,
    {
        if let Some((key, old)) = self.remove_entry(key) {
            if let Some(new) = compute(&key, old) {
                self.insert(key, new);
            }
        }
        Ok(())
    }

    fn try_replace_all<F>(&mut self, mut replace: F) -> Result<(), Error>
    where
        F: FnMut(&K, &V) -> V,
    {
        for (key, value) in self.iter_mut() {
            *value = replace(key, value);
        }
        Ok(())
    }

    fn try_extend<I>(&mut self, pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.extend(pairs);
        Ok(())
    }
}

impl<K, V> MutableMap<K, V> for BTreeMap<K, V>
where
    K: Ord,
{
    fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        Ok(self.insert(key, value))
    }

    fn try_insert_if_absent(&mut self, key: K, value: V) -> Result<bool, Error> {
        if self.contains_key(&key) {
            return Ok(false);
        }
        self.insert(key, value);
        Ok(true)
    }

    fn try_replace(&mut self, key: &K, value: V) -> Result<Option<V>, Error> {
        Ok(self.get_mut(key).map(|slot| mem::replace(slot, value)))
    }

    fn try_remove(&mut self, key: &K) -> Result<Option<V>, Error> {
        Ok(self.remove(key))
    }

    fn try_clear(&mut self) -> Result<(), Error> {
        self.clear();
        Ok(())
    }

    fn try_merge<F>(&mut self, key: K, value: V, merge: F) -> Result<(), Error>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        let merged = match self.remove(&key) {
            None => Some(value),
            Some(old) => merge(old, value),
        };
        if let Some(merged) = merged {
            self.insert(key, merged);
        }
        Ok(())
    }

    fn try_compute<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>,
    {
        let old = self.remove(&key);
        if let Some(new) = compute(&key, old) {
            self.insert(key, new);
        }
        Ok(())
    }

    fn try_compute_if_absent<F>(&mut self, key: K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K) -> V,
    {
        self.entry(key).or_insert_with_key(compute);
        Ok(())
    }

    fn try_compute_if_present<F>(&mut self, key: &K, compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, V) -> Option<V>,
    {
        if let Some((key, old)) = self.remove_entry(key) {
            if let Some(new) = compute(&key, old) {
                self.insert(key, new);
            }
        }
        Ok(())
    }

    fn try_replace_all<F>(&mut self, mut replace: F) -> Result<(), Error>
    where
        F: FnMut(&K, &V) -> V,
    {
        for (key, value) in self.iter_mut() {
            *value = replace(key, value);
        }
        Ok(())
    }

    fn try_extend<I>(&mut self, pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.extend(pairs);
        Ok(())
    }
}

fn unsupported<A>(operation: &'static str) -> Result<A, Error> {
    Err(Error::UnsupportedMutation { operation })
}

/// Every mutator fails with [`Error::UnsupportedMutation`] before looking
/// at its arguments. Callbacks are never invoked.
impl<K, V, S, P> MutableMap<K, V> for GenericFrozenMap<K, V, S, P>
where
    P: SharedPointerKind,
{
    fn try_insert(&mut self, _key: K, _value: V) -> Result<Option<V>, Error> {
        unsupported("insert")
    }

    fn try_insert_if_absent(&mut self, _key: K, _value: V) -> Result<bool, Error> {
        unsupported("insert_if_absent")
    }

    fn try_replace(&mut self, _key: &K, _value: V) -> Result<Option<V>, Error> {
        unsupported("replace")
    }

    fn try_remove(&mut self, _key: &K) -> Result<Option<V>, Error> {
        unsupported("remove")
    }

    fn try_clear(&mut self) -> Result<(), Error> {
        unsupported("clear")
    }

    fn try_merge<F>(&mut self, _key: K, _value: V, _merge: F) -> Result<(), Error>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        unsupported("merge")
    }

    fn try_compute<F>(&mut self, _key: K, _compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>,
    {
        unsupported("compute")
    }

    fn try_compute_if_absent<F>(&mut self, _key: K, _compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K) -> V,
    {
        unsupported("compute_if_absent")
    }

    fn try_compute_if_present<F>(&mut self, _key: &K, _compute: F) -> Result<(), Error>
    where
        F: FnOnce(&K, V) -> Option<V>,
    {
        unsupported("compute_if_present")
    }

    fn try_replace_all<F>(&mut self, _replace: F) -> Result<(), Error>
    where
        F: FnMut(&K, &V) -> V,
    {
        unsupported("replace_all")
    }

    fn try_extend<I>(&mut self, _pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        unsupported("extend")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{frozenmap, FrozenMap};

    fn exercise<M: MutableMap<i32, i32>>(map: &mut M) -> Vec<Result<(), Error>> {
        vec![
            map.try_insert(10, 10).map(drop),
            map.try_insert_if_absent(11, 11).map(drop),
            map.try_replace(&1, 100).map(drop),
            map.try_remove(&2).map(drop),
            map.try_merge(1, 5, |a, b| Some(a + b)),
            map.try_compute(3, |_, old| old.map(|v| v * 2)),
            map.try_compute_if_absent(12, |k| k * 2),
            map.try_compute_if_present(&10, |_, _| None),
            map.try_replace_all(|_, v| v + 1),
            map.try_extend(vec![(20, 20)]),
        ]
    }

    #[test]
    fn frozen_map_refuses_everything() {
        let mut map: FrozenMap<i32, i32> = frozenmap! {1 => 1, 2 => 2, 3 => 3}.unwrap();
        let before = map.clone();
        let outcomes = exercise(&mut map);
        assert!(outcomes
            .iter()
            .all(|outcome| matches!(outcome, Err(Error::UnsupportedMutation { .. }))));
        assert_eq!(
            Err(Error::UnsupportedMutation { operation: "clear" }),
            map.try_clear()
        );
        assert!(map.ptr_eq(&before));
        assert_eq!(3, map.len());
        assert_eq!(Some(&2), map.get(&2));
    }

    #[test]
    fn std_maps_accept_everything() {
        let mut hash: HashMap<i32, i32> = (1..=3).map(|i| (i, i)).collect();
        let mut tree: BTreeMap<i32, i32> = (1..=3).map(|i| (i, i)).collect();
        assert!(exercise(&mut hash).iter().all(Result::is_ok));
        assert!(exercise(&mut tree).iter().all(Result::is_ok));
        // 1 -> 100 -> 105, 2 removed, 3 -> 6, 10 removed, 11, 12 -> 24, 20, then +1 all round
        let expected: BTreeMap<i32, i32> =
            [(1, 106), (3, 7), (11, 12), (12, 25), (20, 20)].into_iter().collect();
        assert_eq!(expected, tree);
        assert_eq!(expected, hash.into_iter().collect::<BTreeMap<_, _>>());
    }
}
