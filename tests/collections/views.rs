//! Store View Tests
//!
//! Set and non-iterable views over the collection core, and kind checks on
//! reopen.

use crate::common::*;

#[test]
fn set_membership() {
    let env = TestEnv::new();
    let set = env.set("tags");
    set.add_all(vec![s("b"), s("a"), s("b")]).unwrap();
    assert_eq!(set.size(), 2);
    assert!(set.has(&s("a")).unwrap());
    set.delete(&s("a")).unwrap();
    assert!(!set.has(&s("a")).unwrap());
    assert!(matches!(set.delete(&s("a")), Err(Error::KeyNotFound { .. })));
}

#[test]
fn set_iteration_views() {
    let env = TestEnv::new();
    let set = env.set("nums");
    set.add_all((1..=5).rev().map(|i| num(i as f64))).unwrap();
    let expected: Vec<Key> = (1..=5).map(|i| num(i as f64)).collect();
    assert_eq!(set.snapshot().unwrap(), expected);
    let pairs: Vec<(Key, Key)> = set.entries().unwrap().collect::<Result<_>>().unwrap();
    assert!(pairs.iter().all(|(k, v)| k == v));
    let small: Vec<Key> = set
        .keys_matching(&Pattern::Lte(num(2.0)))
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(small, vec![num(1.0), num(2.0)]);
    set.clear_matching(&Pattern::Gt(num(3.0))).unwrap();
    assert_eq!(set.get_size(&Pattern::Any).unwrap(), 3);
}

#[test]
fn set_key_pattern() {
    let env = TestEnv::new();
    let set = env
        .registry
        .create_set_store("caps", Some(Pattern::Kind(KeyKind::CapRef)))
        .unwrap();
    set.add(&cap("o+1")).unwrap();
    assert!(matches!(set.add(&s("x")), Err(Error::InvalidKeyType { .. })));
}

#[test]
fn non_iterable_stores_hold_references() {
    let env = TestEnv::new();
    let weak_map = env
        .registry
        .create_non_iterable_map_store("weak", Some(Pattern::Kind(KeyKind::CapRef)))
        .unwrap();
    let weak_set = env
        .registry
        .create_non_iterable_set_store("weakset", None)
        .unwrap();

    weak_map.init(&cap("o+1"), &Value::from("meta")).unwrap();
    weak_set.add(&cap("o+1")).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 2);

    weak_map.delete(&cap("o+1")).unwrap();
    weak_set.clear().unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 0);
}

#[test]
fn typed_reopen_checks_kind() {
    let env = TestEnv::new();
    env.set("s");
    env.registry
        .create_non_iterable_set_store("w", None)
        .unwrap();
    let env2 = env.reopen();
    assert!(env2.registry.get_set_store("s").unwrap().is_some());
    assert!(env2
        .registry
        .get_non_iterable_set_store("w")
        .unwrap()
        .is_some());
    assert!(matches!(
        env2.registry.get_non_iterable_map_store("s"),
        Err(Error::CollectionKindMismatch { .. })
    ));
    assert!(env2.registry.get_map_store("missing").unwrap().is_none());
}
