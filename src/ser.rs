// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use archery::SharedPointerKind;
use serde::de::{Deserialize, Deserializer, Error as DeError, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use crate::frozen::builder::GenericBuilder;
use crate::frozen::entry::Entry;
use crate::frozen::map::GenericFrozenMap;

struct MapVisitor<'de, K, V, S, P> {
    phantom_k: PhantomData<K>,
    phantom_v: PhantomData<V>,
    phantom_s: PhantomData<S>,
    phantom_p: PhantomData<P>,
    phantom_lifetime: PhantomData<&'de ()>,
}

impl<'de, K, V, S, P> MapVisitor<'de, K, V, S, P> {
    pub(crate) fn new() -> MapVisitor<'de, K, V, S, P> {
        MapVisitor {
            phantom_k: PhantomData,
            phantom_v: PhantomData,
            phantom_s: PhantomData,
            phantom_p: PhantomData,
            phantom_lifetime: PhantomData,
        }
    }
}

impl<'de, K, V, S, P> Visitor<'de> for MapVisitor<'de, K, V, S, P>
where
    K: Deserialize<'de> + Hash + Eq + Clone,
    V: Deserialize<'de> + Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    type Value = GenericFrozenMap<K, V, S, P>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map without repeated keys")
    }

    fn visit_map<Access>(self, mut access: Access) -> Result<Self::Value, Access::Error>
    where
        Access: MapAccess<'de>,
    {
        let mut builder = match access.size_hint() {
            None => GenericBuilder::default(),
            Some(l) => GenericBuilder::with_capacity_and_hasher(l, S::default()),
        };
        while let Some((k, v)) = access.next_entry()? {
            builder.put(k, v);
        }
        builder.into_map_or_throw().map_err(Access::Error::custom)
    }
}

// Map

impl<'de, K, V, S, P> Deserialize<'de> for GenericFrozenMap<K, V, S, P>
where
    K: Deserialize<'de> + Hash + Eq + Clone,
    V: Deserialize<'de> + Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    fn deserialize<D>(des: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        des.deserialize_map(MapVisitor::<'de, K, V, S, P>::new())
    }
}

impl<K, V, S, P> Serialize for GenericFrozenMap<K, V, S, P>
where
    K: Serialize,
    V: Serialize,
    P: SharedPointerKind,
{
    fn serialize<Ser>(&self, ser: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut s = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            s.serialize_entry(k, v)?;
        }
        s.end()
    }
}

// Entry

impl<K: Serialize, V: Serialize> Serialize for Entry<K, V> {
    fn serialize<Ser>(&self, ser: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut s = ser.serialize_struct("Entry", 2)?;
        s.serialize_field("key", self.key())?;
        s.serialize_field("value", self.value())?;
        s.end()
    }
}

// Tests

#[cfg(test)]
mod test {
    use super::*;
    use crate::{frozenmap, proptest::frozen_map, FrozenMap};
    use ::proptest::num::i32;
    use ::proptest::proptest;
    use serde_json::{from_str, to_string};

    #[test]
    fn serializes_in_iteration_order() {
        let map: FrozenMap<&str, i32> = frozenmap! {"b" => 2, "a" => 1, "c" => 3}.unwrap();
        assert_eq!(r#"{"b":2,"a":1,"c":3}"#, to_string(&map).unwrap());
        assert_eq!(
            r#"{"key":"b","value":2}"#,
            to_string(map.entry_set().get(0).unwrap()).unwrap()
        );
    }

    #[test]
    fn repeated_keys_fail_to_deserialize() {
        let result = from_str::<FrozenMap<String, i32>>(r#"{"a":1,"b":2,"a":3}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("entry #0 and entry #2"), "{}", message);
    }

    proptest! {
        #[test]
        fn ser_frozen_map(ref v in frozen_map(i32::ANY, i32::ANY, 0..100)) {
            let decoded: FrozenMap<i32, i32> = from_str(&to_string(v).unwrap()).unwrap();
            assert_eq!(v, &decoded);
            assert_eq!(v.keys().collect::<Vec<_>>(), decoded.keys().collect::<Vec<_>>());
        }
    }
}
