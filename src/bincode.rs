// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::hash::{BuildHasher, Hash};

use archery::SharedPointerKind;
use bincode::de::Decoder;
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode};

use crate::frozen::builder::GenericBuilder;
use crate::frozen::map::GenericFrozenMap;

// Maps are encoded as their length followed by their pairs in iteration
// order, and decoded through a builder, so repeated keys fail to decode.

impl<C, K, V, S, P> Decode<C> for GenericFrozenMap<K, V, S, P>
where
    K: Decode<C> + Hash + Eq + Clone,
    V: Decode<C> + Clone,
    S: BuildHasher + Default + Clone,
    P: SharedPointerKind,
{
    fn decode<D: Decoder<Context = C>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let len: usize = Decode::decode(decoder)?;
        let mut builder = GenericBuilder::default();
        for _ in 0..len {
            let (k, v): (K, V) = Decode::decode(decoder)?;
            builder.put(k, v);
        }
        builder
            .into_map_or_throw()
            .map_err(|error| DecodeError::OtherString(error.to_string()))
    }
}

impl<K, V, S, P> Encode for GenericFrozenMap<K, V, S, P>
where
    K: Encode,
    V: Encode,
    P: SharedPointerKind,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.len(), encoder)?;
        for (k, v) in self.iter() {
            Encode::encode(&(k, v), encoder)?;
        }
        Ok(())
    }
}

// Tests

#[cfg(test)]
mod test {
    use crate::{proptest::frozen_map, FrozenMap};
    use bincode::{decode_from_slice, encode_to_vec};
    use proptest::num::i32;
    use proptest::proptest;

    #[test]
    fn repeated_keys_fail_to_decode() {
        let config = bincode::config::standard();
        let bytes = encode_to_vec((2usize, (1i32, 1i32), (1i32, 2i32)), config).unwrap();
        assert!(decode_from_slice::<FrozenMap<i32, i32>, _>(&bytes, config).is_err());
    }

    proptest! {
        #[cfg_attr(miri, ignore)]
        #[test]
        fn encode_and_decode_frozen_map(ref v in frozen_map(i32::ANY, i32::ANY, 0..100)) {
            let config = bincode::config::standard();
            let decoded = decode_from_slice::<FrozenMap::<i32, i32>, _>(&encode_to_vec(v, config).unwrap(), config).unwrap().0;
            assert_eq!(v, &decoded);
            assert_eq!(v.keys().collect::<Vec<_>>(), decoded.keys().collect::<Vec<_>>());
        }
    }
}
