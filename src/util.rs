// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Every codebase needs a `util` module.

use std::hash::{BuildHasher, BuildHasherDefault, DefaultHasher, Hash};

use archery::{SharedPointer, SharedPointerKind};

pub(crate) fn clone_ref<A, P>(r: SharedPointer<A, P>) -> A
where
    A: Clone,
    P: SharedPointerKind,
{
    SharedPointer::try_unwrap(r).unwrap_or_else(|r| (*r).clone())
}

/// Hash a value with a fixed, unkeyed hasher, so that the result only
/// depends on the value itself.
pub(crate) fn stable_hash<A: Hash + ?Sized>(value: &A) -> u64 {
    BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
}
