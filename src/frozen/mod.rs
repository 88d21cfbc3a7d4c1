// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frozen map, its builder and the views derived from it.

pub mod builder;
pub mod entry;
pub mod map;
pub mod multimap;
pub mod views;
