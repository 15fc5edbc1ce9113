//! Iteration Behavior Tests
//!
//! Laziness, mutation during iteration, and invalidation.

use crate::common::*;

#[test]
fn iteration_is_lazy() {
    let env = TestEnv::new();
    let map = env.map("m");
    for i in 0..100 {
        map.init(&num(i as f64), &Value::Null).unwrap();
    }
    let mut keys = map.keys().unwrap();
    assert_eq!(keys.next().unwrap().unwrap(), num(0.0));
    drop(keys);
    assert_eq!(map.size(), 100);
}

#[test]
fn delete_ahead_of_cursor_is_skipped() {
    let env = TestEnv::new();
    let map = env.map("m");
    for word in ["a", "b", "c", "d"] {
        map.init(&s(word), &Value::Null).unwrap();
    }
    let mut seen = Vec::new();
    for key in map.keys().unwrap() {
        let key = key.unwrap();
        if key == s("a") {
            map.delete(&s("c")).unwrap();
        }
        seen.push(key);
    }
    assert_eq!(seen, vec![s("a"), s("b"), s("d")]);
}

#[test]
fn delete_each_while_iterating() {
    let env = TestEnv::new();
    let map = env.map("m");
    for i in 0..10 {
        map.init(&num(i as f64), &Value::Null).unwrap();
    }
    for key in map.keys().unwrap() {
        map.delete(&key.unwrap()).unwrap();
    }
    assert_eq!(map.size(), 0);
}

#[test]
fn insert_during_iteration_invalidates() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("a"), &Value::Null).unwrap();
    map.init(&s("b"), &Value::Null).unwrap();

    let mut values = map.values().unwrap();
    values.next().unwrap().unwrap();
    map.init(&s("c"), &Value::Null).unwrap();
    assert!(matches!(
        values.next(),
        Some(Err(Error::IterationInvalidated(_)))
    ));
    assert!(values.next().is_none());

    // A fresh iterator is unaffected
    assert_eq!(keys_of(&map).len(), 3);
}

#[test]
fn insert_into_other_collection_does_not_invalidate() {
    let env = TestEnv::new();
    let map = env.map("m");
    let other = env.map("other");
    map.init(&s("a"), &Value::Null).unwrap();
    map.init(&s("b"), &Value::Null).unwrap();
    let mut keys = map.keys().unwrap();
    keys.next().unwrap().unwrap();
    other.init(&s("x"), &Value::Null).unwrap();
    assert_eq!(keys.next().unwrap().unwrap(), s("b"));
}

#[test]
fn unsupported_value_pattern() {
    let env = TestEnv::new();
    let map = env.map("m");
    assert!(matches!(
        map.entries_matching(&Pattern::Any, &Pattern::Kind(KeyKind::String)),
        Err(Error::UnsupportedValuePattern)
    ));
    assert!(matches!(
        map.clear_matching(&Pattern::Any, &Pattern::Eq(Key::Null)),
        Err(Error::UnsupportedValuePattern)
    ));
}

#[test]
fn corrupt_value_row_surfaces_on_read() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("a"), &Value::Null).unwrap();
    let row = format!("vc.{}.sa", map.collection().id());
    env.store.set(row.as_bytes(), b"not json").unwrap();

    assert!(matches!(map.get(&s("a")), Err(Error::Corruption(_))));
    assert_eq!(keys_of(&map), vec![s("a")]);
    let mut values = map.values().unwrap();
    assert!(matches!(values.next(), Some(Err(Error::Corruption(_)))));
}
