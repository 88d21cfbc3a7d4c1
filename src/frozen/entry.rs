// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Immutable key/value pairs.

use std::fmt::{Display, Error as FmtError, Formatter};

use crate::error::Error;

/// An immutable key/value pair.
///
/// This is what a [`Builder`][crate::Builder] accumulates and what a
/// [`FrozenMap`][crate::FrozenMap] stores, in iteration order. Two entries
/// are equal when both their keys and their values are equal.
///
/// # Examples
///
/// ```
/// # use frozenmap::Entry;
/// let entry = Entry::new("a", 1);
/// assert_eq!(&"a", entry.key());
/// assert_eq!(&1, entry.value());
/// assert_eq!("a=1", entry.to_string());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Construct an entry from a key and a value.
    #[inline]
    #[must_use]
    pub fn new(key: K, value: V) -> Self {
        Entry { key, value }
    }

    /// Construct an entry from a key and a value which may be absent.
    ///
    /// This is the entry point for sources where keys or values are
    /// optional, eg. decoded records with missing fields. Fails with
    /// [`Error::NullArgument`] naming the key if it is missing, otherwise
    /// naming the value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use frozenmap::{Entry, Error};
    /// assert_eq!(Ok(Entry::new(1, 2)), Entry::try_new(Some(1), Some(2)));
    /// assert_eq!(
    ///     Err(Error::NullArgument { what: "value" }),
    ///     Entry::<i32, i32>::try_new(Some(1), None)
    /// );
    /// ```
    pub fn try_new(key: Option<K>, value: Option<V>) -> Result<Self, Error> {
        let key = key.ok_or(Error::NullArgument { what: "key" })?;
        let value = value.ok_or(Error::NullArgument { what: "value" })?;
        Ok(Entry { key, value })
    }

    /// Get the entry's key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Get the entry's value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Borrow the entry as a key/value tuple.
    #[inline]
    #[must_use]
    pub fn as_pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Convert the entry into a key/value tuple.
    #[inline]
    #[must_use]
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    #[inline]
    fn from((key, value): (K, V)) -> Self {
        Entry::new(key, value)
    }
}

impl<K, V> From<Entry<K, V>> for (K, V) {
    #[inline]
    fn from(entry: Entry<K, V>) -> Self {
        entry.into_pair()
    }
}

impl<K: Display, V: Display> Display for Entry<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::stable_hash;

    #[test]
    fn missing_key_is_reported_before_missing_value() {
        assert_eq!(
            Err(Error::NullArgument { what: "key" }),
            Entry::<i32, i32>::try_new(None, None)
        );
        assert_eq!(
            Err(Error::NullArgument { what: "key" }),
            Entry::<i32, i32>::try_new(None, Some(1))
        );
    }

    #[test]
    fn equality_and_hash_follow_content() {
        let a = Entry::new("k", 1);
        let b = Entry::from(("k", 1));
        assert_eq!(a, b);
        assert_eq!(stable_hash(&a), stable_hash(&b));
        assert_ne!(a, Entry::new("k", 2));
        assert_eq!(("k", 1), b.into_pair());
    }
}
