// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Frozen Maps
//!
//! This library provides an immutable map which is built once and never
//! changes afterwards, together with the builder that constructs it and
//! a handful of read only views derived from it.
//!
//! ## Building
//!
//! Entries are appended to a [`Builder`] in any order, possibly with
//! repeated keys, and checked only when the builder is built. A build
//! either rejects repeated keys with an [`Error::DuplicateKey`] naming
//! the two offending positions, or keeps the last value for each key at
//! the position where the key first appeared.
//!
//! ```
//! # use frozenmap::{Builder, Error};
//! let mut builder = Builder::new();
//! builder.put("one", 1).put("two", 2).put("one", 3);
//! assert_eq!(
//!     Err(Error::DuplicateKey { first: 0, second: 2 }),
//!     builder.build_or_throw()
//! );
//! let map = builder.build_keeping_last();
//! assert_eq!(vec![(&"one", &3), (&"two", &2)], map.iter().collect::<Vec<_>>());
//! ```
//!
//! Small maps of up to one entry don't carry a hash index at all. Larger
//! ones are laid out as a flat array of entries plus a chained hash index
//! into it, which is abandoned for a randomly keyed index should too many
//! keys land in the same chain.
//!
//! ## Sharing
//!
//! Maps are cheap to clone, and clones share everything, including the
//! [views][frozen::views] which are created lazily the first time they're
//! asked for. Like the standard library's collections, a map is [`Send`]
//! and [`Sync`] when its contents are, and the views are safe to create
//! from several threads at once.
//!
//! By default, shared data is reference counted using [`Arc`], but you
//! can pick any [`SharedPointerKind`][shared_ptr::SharedPointerKind] for
//! the pointer type parameter `P` of [`GenericFrozenMap`] and
//! [`GenericBuilder`], such as [`RcK`][shared_ptr::RcK] for maps which
//! never leave their thread.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! | ------- | ----------- |
//! | [`triomphe`](https://crates.io/crates/triomphe) | Use [`triomphe::Arc`](https://docs.rs/triomphe/latest/triomphe/struct.Arc.html) as the default shared pointer |
//! | [`proptest`](https://crates.io/crates/proptest) | Strategies for frozen maps and builders |
//! | [`quickcheck`](https://crates.io/crates/quickcheck) | [`quickcheck::Arbitrary`](https://docs.rs/quickcheck/latest/quickcheck/trait.Arbitrary.html) implementations |
//! | [`arbitrary`](https://crates.io/crates/arbitrary/) | [`arbitrary::Arbitrary`](https://docs.rs/arbitrary/latest/arbitrary/trait.Arbitrary.html) implementations |
//! | [`serde`](https://crates.io/crates/serde) | [`Serialize`](https://docs.rs/serde/latest/serde/trait.Serialize.html) and [`Deserialize`](https://docs.rs/serde/latest/serde/trait.Deserialize.html) implementations |
//! | [`rayon`](https://crates.io/crates/rayon) | Parallel iteration and parallel collection |
//! | [`bincode`](https://crates.io/crates/bincode) | [`Encode`](https://docs.rs/bincode/latest/bincode/enc/trait.Encode.html) and [`Decode`](https://docs.rs/bincode/latest/bincode/de/trait.Decode.html) implementations |
//!
//! [`Arc`]: std::sync::Arc

#![forbid(rust_2018_idioms)]
#![deny(nonstandard_style)]
#![warn(unreachable_pub, missing_docs)]

mod config;
mod nodes;
mod util;

pub mod error;
pub mod frozen;
pub mod mapping;
pub mod shared_ptr;

#[cfg(any(test, feature = "serde"))]
#[doc(hidden)]
pub mod ser;

#[cfg(feature = "bincode")]
#[doc(hidden)]
pub mod bincode;

#[cfg(feature = "arbitrary")]
#[doc(hidden)]
pub mod arbitrary;

#[cfg(feature = "quickcheck")]
#[doc(hidden)]
pub mod quickcheck;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

#[cfg(any(test, feature = "rayon"))]
pub mod rayon;


pub use crate::error::Error;
pub use crate::frozen::builder::{Builder, GenericBuilder};
pub use crate::frozen::entry::Entry;
pub use crate::frozen::map::{FrozenMap, GenericFrozenMap};
pub use crate::mapping::MutableMap;
