// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// The longest hash chain the primary layout will tolerate in a small
/// table before the map is rebuilt on a keyed hasher.
pub(crate) const MAX_BUCKET_LEN: usize = 8;

/// The chain limit grows by one each time the table grows by this many
/// powers of two, so that large tables of well hashed keys stay clear of
/// it.
pub(crate) const FLOOD_CHAIN_STEP: u32 = 4;

/// The maximum load factor of the primary layout, as a fraction:
/// at most 6 entries for every 5 buckets.
pub(crate) const MAX_LOAD_FACTOR_NUM: usize = 6;
pub(crate) const MAX_LOAD_FACTOR_DEN: usize = 5;

/// The capacity a builder's arena starts out with once it receives its
/// first entry.
pub(crate) const BUILDER_MIN_CAPACITY: usize = 4;
