// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fallback hash index, used once the primary index has seen a chain
//! grow past its limit, which starts at
//! [`MAX_BUCKET_LEN`][crate::config::MAX_BUCKET_LEN].
//!
//! Keys are hashed with a freshly seeded SipHash rather than the map's
//! own hasher, so collisions engineered against the latter don't carry
//! over, and probing happens in a swiss table.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use hashbrown::hash_table::{Entry as TableEntry, HashTable};

use crate::frozen::entry::Entry;
use crate::nodes::table::{Flooded, Slots};

pub(crate) struct KeyedIndex {
    table: HashTable<usize>,
    state: RandomState,
}

impl KeyedIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        KeyedIndex {
            table: HashTable::with_capacity(capacity),
            state: RandomState::new(),
        }
    }

    pub(crate) fn position<K, V, BK>(&self, entries: &[Entry<K, V>], key: &BK) -> Option<usize>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        let hash = self.state.hash_one(key);
        self.table
            .find(hash, |&pos| entries[pos].key().borrow() == key)
            .copied()
    }
}

impl Slots for KeyedIndex {
    fn claim<K: Hash + Eq, V>(
        &mut self,
        entries: &[Entry<K, V>],
        pos: usize,
    ) -> Result<Option<usize>, Flooded> {
        let state = &self.state;
        let key = entries[pos].key();
        let slot = self.table.entry(
            state.hash_one(key),
            |&other| entries[other].key() == key,
            |&other| state.hash_one(entries[other].key()),
        );
        Ok(match slot {
            TableEntry::Occupied(occupied) => Some(*occupied.get()),
            TableEntry::Vacant(vacant) => {
                vacant.insert(pos);
                None
            }
        })
    }

    fn renumber(&mut self, positions: &[usize]) {
        // Only positions with a slot are ever renumbered, and those are kept.
        for pos in self.table.iter_mut() {
            *pos = positions[*pos];
        }
    }
}
