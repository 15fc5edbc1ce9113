//! Randomized Operation Tests
//!
//! Drives a map with random operations and compares every observable
//! against a BTreeMap model ordered by encoded key.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::*;

fn random_key(rng: &mut StdRng) -> Key {
    match rng.gen_range(0..5) {
        0 => num(rng.gen_range(-20..20) as f64 / 4.0),
        1 => big(rng.gen_range(-1000..1000)),
        2 => s(&format!("k{}", rng.gen_range(0..30))),
        3 => Key::Bool(rng.gen()),
        _ => cap(&format!("o+{}", rng.gen_range(0..10))),
    }
}

fn sort_key(key: &Key) -> Vec<u8> {
    ordcoll_primitives::encode_key(key, |_| Ok(0)).unwrap()
}

#[test]
fn random_operations_match_model() {
    let env = TestEnv::new();
    let map = env.map("random");
    // Model keyed by key; cap refs are ordered separately by insertion
    let mut model: BTreeMap<Vec<u8>, (Key, Value)> = BTreeMap::new();
    let mut cap_order: Vec<Key> = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for step in 0..2000 {
        let key = random_key(&mut rng);
        let value = Value::from(step as f64);
        let present = map.has(&key).unwrap();
        let id = sort_key(&key);
        assert_eq!(present, model.contains_key(&id), "step {}", step);

        match rng.gen_range(0..3) {
            0 => match map.init(&key, &value) {
                Ok(()) => {
                    assert!(!present);
                    model.insert(id, (key.clone(), value));
                    if key.kind() == KeyKind::CapRef {
                        cap_order.push(key);
                    }
                }
                Err(Error::DuplicateKey { .. }) => assert!(present),
                Err(e) => panic!("unexpected error {}", e),
            },
            1 => match map.set(&key, &value) {
                Ok(()) => {
                    assert!(present);
                    model.insert(id, (key, value));
                }
                Err(Error::KeyNotFound { .. }) => assert!(!present),
                Err(e) => panic!("unexpected error {}", e),
            },
            _ => match map.delete(&key) {
                Ok(()) => {
                    assert!(present);
                    model.remove(&id);
                    cap_order.retain(|k| k != &key);
                }
                Err(Error::KeyNotFound { .. }) => assert!(!present),
                Err(e) => panic!("unexpected error {}", e),
            },
        }
        assert_eq!(map.size(), model.len() as u64);
    }

    // Non-reference keys follow encoded order; references follow insertion
    let mut expected: Vec<Key> = Vec::new();
    let mut caps_emitted = false;
    for (key, _) in model.values() {
        if key.kind() == KeyKind::CapRef {
            if !caps_emitted {
                expected.extend(cap_order.iter().cloned());
                caps_emitted = true;
            }
        } else {
            expected.push(key.clone());
        }
    }
    assert_eq!(keys_of(&map), expected);

    for (key, value) in model.values() {
        assert_eq!(&map.get(key).unwrap(), value);
    }

    map.clear().unwrap();
    assert_eq!(map.size(), 0);
    assert!(env.tracker.live_refs().is_empty());
}
