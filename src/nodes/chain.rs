// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The primary hash index: a power of two sized bucket table with
//! chains threaded through a `next` array, both holding positions into
//! the map's entry array.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use crate::config::{FLOOD_CHAIN_STEP, MAX_BUCKET_LEN, MAX_LOAD_FACTOR_DEN, MAX_LOAD_FACTOR_NUM};
use crate::frozen::entry::Entry;
use crate::nodes::table::{Flooded, Slots, VACANT};

// 2^64 / golden ratio
const FIBONACCI: u64 = 0x9E37_79B9_7F4A_7C15;

pub(crate) fn hash_key<K: Hash + ?Sized, S: BuildHasher>(bh: &S, key: &K) -> u64 {
    bh.hash_one(key)
}

fn table_size(len: usize) -> usize {
    let mut size = len.max(2).next_power_of_two();
    while size * MAX_LOAD_FACTOR_NUM < len * MAX_LOAD_FACTOR_DEN {
        size <<= 1;
    }
    size
}

/// The longest chain a table of `size` buckets accepts. The longest of
/// `n` chains under a good hash grows like `log n / log log n`, so a
/// fixed limit that's tight for small tables trips on large ones.
fn chain_limit(size: usize) -> usize {
    MAX_BUCKET_LEN + (size.trailing_zeros() / FLOOD_CHAIN_STEP) as usize
}

pub(crate) struct ChainIndex {
    heads: Box<[usize]>,
    next: Box<[usize]>,
    shift: u32,
}

impl ChainIndex {
    fn with_len(len: usize) -> Self {
        let size = table_size(len);
        ChainIndex {
            heads: vec![VACANT; size].into_boxed_slice(),
            next: vec![VACANT; len].into_boxed_slice(),
            shift: u64::BITS - size.trailing_zeros(),
        }
    }

    /// Start placing `len` entries hashed by `hasher`.
    pub(crate) fn slots<S: BuildHasher>(len: usize, hasher: &S) -> ChainSlots<'_, S> {
        let index = ChainIndex::with_len(len);
        ChainSlots {
            max_chain_len: chain_limit(index.heads.len()),
            index,
            hasher,
        }
    }

    // Multiplicative hashing takes the top bits, so every bit of the
    // caller's hash has a say in the bucket.
    #[inline]
    fn bucket(&self, hash: u64) -> usize {
        (hash.wrapping_mul(FIBONACCI) >> self.shift) as usize
    }

    pub(crate) fn position<K, V, BK, S>(
        &self,
        hasher: &S,
        entries: &[Entry<K, V>],
        key: &BK,
    ) -> Option<usize>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
        S: BuildHasher,
    {
        let mut cursor = self.heads[self.bucket(hash_key(hasher, key))];
        while cursor != VACANT {
            if entries[cursor].key().borrow() == key {
                return Some(cursor);
            }
            cursor = self.next[cursor];
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn longest_chain(&self) -> usize {
        self.heads
            .iter()
            .map(|&head| {
                let mut len = 0;
                let mut cursor = head;
                while cursor != VACANT {
                    len += 1;
                    cursor = self.next[cursor];
                }
                len
            })
            .max()
            .unwrap_or(0)
    }
}

/// A [`ChainIndex`] under construction, along with the hasher it places
/// keys with.
pub(crate) struct ChainSlots<'a, S> {
    index: ChainIndex,
    hasher: &'a S,
    max_chain_len: usize,
}

impl<S> ChainSlots<'_, S> {
    pub(crate) fn into_index(self) -> ChainIndex {
        self.index
    }

    pub(crate) fn max_chain_len(&self) -> usize {
        self.max_chain_len
    }
}

impl<S: BuildHasher> Slots for ChainSlots<'_, S> {
    fn claim<K: Hash + Eq, V>(
        &mut self,
        entries: &[Entry<K, V>],
        pos: usize,
    ) -> Result<Option<usize>, Flooded> {
        let index = &mut self.index;
        let key = entries[pos].key();
        let bucket = index.bucket(hash_key(self.hasher, key));
        let mut chain_len = 0;
        let mut cursor = index.heads[bucket];
        while cursor != VACANT {
            if entries[cursor].key() == key {
                return Ok(Some(cursor));
            }
            chain_len += 1;
            cursor = index.next[cursor];
        }
        if chain_len >= self.max_chain_len {
            return Err(Flooded);
        }
        index.next[pos] = index.heads[bucket];
        index.heads[bucket] = pos;
        Ok(None)
    }

    fn renumber(&mut self, positions: &[usize]) {
        let index = &mut self.index;
        let remap = |pos: usize| if pos == VACANT { VACANT } else { positions[pos] };
        let kept = positions.iter().filter(|&&pos| pos != VACANT).count();
        let mut next = vec![VACANT; kept].into_boxed_slice();
        for (old, &new) in positions.iter().enumerate() {
            if new != VACANT {
                next[new] = remap(index.next[old]);
            }
        }
        for head in index.heads.iter_mut() {
            *head = remap(*head);
        }
        index.next = next;
    }
}
