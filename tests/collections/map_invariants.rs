//! Map Invariant Tests
//!
//! - init then has/get
//! - delete then has/get
//! - size tracks live inits minus deletes
//! - failed operations leave the map unchanged

use crate::common::*;

#[test]
fn init_then_get() {
    let env = TestEnv::new();
    let map = env.map("m");
    let value = Value::List(vec![Value::from("a"), Value::from(2.0), Value::Undefined]);
    map.init(&s("k"), &value).unwrap();
    assert!(map.has(&s("k")).unwrap());
    assert_eq!(map.get(&s("k")).unwrap(), value);
}

#[test]
fn delete_then_missing() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&num(1.0), &Value::Null).unwrap();
    map.delete(&num(1.0)).unwrap();
    assert!(!map.has(&num(1.0)).unwrap());
    assert!(matches!(map.get(&num(1.0)), Err(Error::KeyNotFound { .. })));
}

#[test]
fn size_counts_live_entries() {
    let env = TestEnv::new();
    let map = env.map("m");
    for i in 0..10 {
        map.init(&num(i as f64), &Value::Null).unwrap();
    }
    for i in (0..10).step_by(3) {
        map.delete(&num(i as f64)).unwrap();
    }
    assert_eq!(map.size(), 6);
    assert_eq!(keys_of(&map).len(), 6);
}

#[test]
fn set_replaces_value_only() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("k"), &Value::from(1.0)).unwrap();
    map.set(&s("k"), &Value::from(2.0)).unwrap();
    assert_eq!(map.get(&s("k")).unwrap(), Value::from(2.0));
    assert_eq!(map.size(), 1);
}

#[test]
fn failed_init_changes_nothing() {
    let env = TestEnv::small();
    let map = env.map("m");
    map.init(&s("a"), &Value::from(1.0)).unwrap();
    let before = env.store.len();

    assert!(matches!(
        map.init(&s("a"), &Value::from(9.0)),
        Err(Error::DuplicateKey { .. })
    ));
    assert!(matches!(
        map.init(&s("b"), &Value::String("x".repeat(1000))),
        Err(Error::ValueTooLarge { .. })
    ));
    assert!(matches!(
        map.init(&s(&"y".repeat(100)), &Value::Null),
        Err(Error::KeyTooLarge { .. })
    ));

    assert_eq!(env.store.len(), before);
    assert_eq!(map.size(), 1);
    assert_eq!(map.get(&s("a")).unwrap(), Value::from(1.0));
}

#[test]
fn invalid_key_type_on_every_operation() {
    let env = TestEnv::new();
    let map = env.map_with("strings", Pattern::Kind(KeyKind::String));
    let wrong = num(1.0);
    assert!(matches!(map.has(&wrong), Err(Error::InvalidKeyType { .. })));
    assert!(matches!(map.get(&wrong), Err(Error::InvalidKeyType { .. })));
    assert!(matches!(
        map.init(&wrong, &Value::Null),
        Err(Error::InvalidKeyType { .. })
    ));
    assert!(matches!(
        map.set(&wrong, &Value::Null),
        Err(Error::InvalidKeyType { .. })
    ));
    assert!(matches!(map.delete(&wrong), Err(Error::InvalidKeyType { .. })));
    assert!(map.init(&wrong, &Value::Null).unwrap_err().is_validation_error());
}

#[test]
fn unknown_cap_ref_is_not_found() {
    let env = TestEnv::new();
    let map = env.map("m");
    assert!(!map.has(&cap("o+1")).unwrap());
    assert!(matches!(map.get(&cap("o+1")), Err(Error::KeyNotFound { .. })));
    assert!(map.delete(&cap("o+1")).unwrap_err().is_not_found());
    assert!(matches!(
        map.set(&cap("o+1"), &Value::Null),
        Err(Error::KeyNotFound { .. })
    ));
}

#[test]
fn list_values_cannot_be_keys() {
    let value = Value::List(vec![]);
    assert!(matches!(
        Key::try_from(value),
        Err(Error::UnsupportedKeyKind { .. })
    ));
}

#[test]
fn number_keys_are_bit_exact() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&num(0.0), &Value::from("zero")).unwrap();
    map.init(&num(-0.0), &Value::from("negative zero")).unwrap();
    map.init(&num(f64::NAN), &Value::from("nan")).unwrap();
    assert_eq!(map.get(&num(-0.0)).unwrap(), Value::from("negative zero"));
    assert_eq!(map.get(&num(f64::NAN)).unwrap(), Value::from("nan"));
    assert_eq!(keys_of(&map)[0], num(-0.0));
}

#[test]
fn reads_do_not_write() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("a"), &Value::Null).unwrap();
    let before = env.store.mutation_count();
    map.has(&s("a")).unwrap();
    map.get(&s("a")).unwrap();
    keys_of(&map);
    assert_eq!(env.store.mutation_count(), before);
}

#[test]
fn clear_leaves_only_metadata_rows() {
    let env = TestEnv::new();
    let map = env.map("m");
    for word in ["a", "b", "c"] {
        map.init(&s(word), &Value::Null).unwrap();
    }
    map.init(&cap("o+1"), &Value::Null).unwrap();
    map.clear().unwrap();

    let prefix = format!("vc.{}.", map.collection().id());
    let rows = env.store.rows_with_prefix(prefix.as_bytes());
    assert!(!rows.is_empty());
    let marker = format!("{}|", prefix);
    assert!(rows.iter().all(|(k, _)| k.starts_with(marker.as_bytes())));
}
