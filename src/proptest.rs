// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies.
//!
//! These are only available when using the `proptest` feature flag.

use crate::{Builder, FrozenMap};
use ::proptest::collection::{hash_map, vec};
use ::proptest::strategy::{BoxedStrategy, Strategy, ValueTree};
use std::hash::Hash;
use std::ops::Range;

/// A strategy for a [`FrozenMap`] of a given size.
///
/// # Examples
///
/// ```rust,no_run
/// # use ::proptest::proptest;
/// proptest! {
///     #[test]
///     fn proptest_a_frozen_map(ref m in frozenmap::proptest::frozen_map(".*", ".*", 10..100)) {
///         assert!(m.len() < 100);
///         assert!(m.len() >= 10);
///     }
/// }
/// ```
pub fn frozen_map<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<FrozenMap<<K::Tree as ValueTree>::Value, <V::Tree as ValueTree>::Value>>
where
    <K::Tree as ValueTree>::Value: Hash + Eq + Clone,
    <V::Tree as ValueTree>::Value: Clone,
{
    hash_map(key, value, size).prop_map(FrozenMap::from).boxed()
}

/// A strategy for a [`Builder`] holding a given number of entries, keys
/// possibly repeated.
///
/// # Examples
///
/// ```rust,no_run
/// # use ::proptest::proptest;
/// proptest! {
///     #[test]
///     fn proptest_a_builder(ref b in frozenmap::proptest::builder(0..10u8, ".*", 10..100)) {
///         assert!(b.build_keeping_last().len() <= 10);
///     }
/// }
/// ```
pub fn builder<K: Strategy + 'static, V: Strategy + 'static>(
    key: K,
    value: V,
    size: Range<usize>,
) -> BoxedStrategy<Builder<<K::Tree as ValueTree>::Value, <V::Tree as ValueTree>::Value>>
where
    <K::Tree as ValueTree>::Value: Clone,
    <V::Tree as ValueTree>::Value: Clone,
{
    vec((key, value), size)
        .prop_map(|pairs| pairs.into_iter().collect())
        .boxed()
}

#[cfg(test)]
mod test {
    use super::*;
    use ::proptest::num::{i16, u8};
    use ::proptest::proptest;

    proptest! {
        #[test]
        fn frozen_map_respects_size(ref m in frozen_map(i16::ANY, i16::ANY, 5..20)) {
            assert!(m.len() >= 5);
            assert!(m.len() < 20);
        }

        #[test]
        fn builder_respects_size(ref b in builder(u8::ANY, i16::ANY, 5..20)) {
            assert!(b.len() >= 5);
            assert!(b.len() < 20);
            assert!(b.build_keeping_last().len() <= b.len());
        }
    }
}
