// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while building or (attempting to) mutate a frozen map.

use thiserror::Error;

/// Everything that can go wrong when building a [`FrozenMap`][crate::FrozenMap].
///
/// None of these are ever recovered from internally: each is returned to
/// the caller at the point where the violation is detected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A key, value or entry was absent where one was required.
    #[error("{what} must not be absent")]
    NullArgument {
        /// Which part of the input was missing.
        what: &'static str,
    },

    /// Two entries with equal keys were found by a build which rejects
    /// duplicates.
    ///
    /// `first` and `second` are the 0-based positions of the two entries
    /// in the order they were supplied.
    #[error("multiple entries with same key: entry #{first} and entry #{second}")]
    DuplicateKey {
        /// Position of the earlier entry.
        first: usize,
        /// Position of the later entry.
        second: usize,
    },

    /// A builder was configured in a way it doesn't support.
    #[error("illegal builder state: {0}")]
    IllegalBuilderState(&'static str),

    /// A write was attempted on an immutable map.
    #[error("unsupported mutation: `{operation}` on an immutable map")]
    UnsupportedMutation {
        /// The name of the rejected operation.
        operation: &'static str,
    },
}
