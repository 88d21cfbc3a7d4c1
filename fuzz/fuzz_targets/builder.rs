#![no_main]

use std::collections::HashMap as NatMap;
use std::fmt::Debug;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use frozenmap::{Builder, Error, FrozenMap};

#[derive(Arbitrary, Debug)]
enum Action<K, V> {
    Put(K, V),
    Combine(Vec<(K, V)>),
    OrderByValue,
    Build,
}

// What the builder should produce, tracked the plain way.
#[derive(Default)]
struct Model {
    len: usize,
    order: Vec<u8>,
    last: NatMap<u8, u16>,
    first_seen: NatMap<u8, usize>,
    duplicate: Option<(usize, usize)>,
}

impl Model {
    fn put(&mut self, key: u8, value: u16) {
        match self.first_seen.get(&key) {
            Some(first) => {
                if self.duplicate.is_none() {
                    self.duplicate = Some((*first, self.len));
                }
            }
            None => {
                self.first_seen.insert(key, self.len);
                self.order.push(key);
            }
        }
        self.last.insert(key, value);
        self.len += 1;
    }
}

fuzz_target!(|actions: Vec<Action<u8, u16>>| {
    let mut builder = Builder::new();
    let mut model = Model::default();
    let mut by_value = false;

    for action in actions {
        match action {
            Action::Put(key, value) => {
                model.put(key, value);
                builder.put(key, value);
            }
            Action::Combine(pairs) => {
                let mut other = Builder::new();
                for (key, value) in pairs {
                    model.put(key, value);
                    other.put(key, value);
                }
                builder.combine(other);
            }
            Action::OrderByValue => {
                let result = builder.order_entries_by_value(|a: &u16, b: &u16| a.cmp(b));
                assert_eq!(by_value, result.is_err());
                by_value = true;
            }
            Action::Build => {
                assert_eq!(model.len, builder.len());
                let kept: FrozenMap<u8, u16> = builder.build_keeping_last();
                assert_eq!(model.last.len(), kept.len());
                for (key, value) in &model.last {
                    assert_eq!(Some(value), kept.get(key));
                }
                if by_value {
                    let values: Vec<_> = kept.values().collect();
                    assert!(values.windows(2).all(|w| w[0] <= w[1]));
                } else {
                    assert_eq!(
                        model.order.iter().collect::<Vec<_>>(),
                        kept.keys().collect::<Vec<_>>()
                    );
                }
                match (builder.build_or_throw(), model.duplicate) {
                    (Ok(map), None) => assert_eq!(kept, map),
                    (Err(Error::DuplicateKey { first, second }), Some(expected)) => {
                        assert_eq!(expected, (first, second))
                    }
                    (result, expected) => panic!("{:?} vs {:?}", result, expected),
                }
            }
        }
    }
});
