//! Ordinal Tests
//!
//! Capability reference keys iterate in insertion order. Ordinals are
//! stable while a reference is present, distinct across references, and
//! never reused.

use crate::common::*;

#[test]
fn references_iterate_in_insertion_order() {
    let env = TestEnv::new();
    let map = env.map("m");
    for id in ["o+9", "o+1", "o-5", "o+3"] {
        map.init(&cap(id), &Value::Null).unwrap();
    }
    assert_eq!(
        keys_of(&map),
        vec![cap("o+9"), cap("o+1"), cap("o-5"), cap("o+3")]
    );
}

#[test]
fn reinserted_reference_moves_to_the_end() {
    let env = TestEnv::new();
    let map = env.map("m");
    for id in ["o+1", "o+2", "o+3"] {
        map.init(&cap(id), &Value::Null).unwrap();
    }
    map.delete(&cap("o+1")).unwrap();
    map.init(&cap("o+1"), &Value::Null).unwrap();
    assert_eq!(keys_of(&map), vec![cap("o+2"), cap("o+3"), cap("o+1")]);
}

#[test]
fn ordinal_rows_are_stable_and_distinct() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&cap("o+1"), &Value::Null).unwrap();
    map.init(&cap("o+2"), &Value::Null).unwrap();
    let prefix = format!("vc.{}.|ord.", map.collection().id());

    let read = |id: &str| env.store.get(format!("{}{}", prefix, id).as_bytes()).unwrap();
    let first = read("o+1");
    map.set(&cap("o+1"), &Value::from(1.0)).unwrap();
    assert_eq!(read("o+1"), first);
    assert_ne!(read("o+1"), read("o+2"));

    map.delete(&cap("o+1")).unwrap();
    assert_eq!(read("o+1"), None);
}

#[test]
fn ordinals_are_per_collection() {
    let env = TestEnv::new();
    let first = env.map("first");
    let second = env.map("second");
    first.init(&cap("o+1"), &Value::Null).unwrap();
    first.init(&cap("o+2"), &Value::Null).unwrap();
    second.init(&cap("o+2"), &Value::Null).unwrap();
    second.init(&cap("o+1"), &Value::Null).unwrap();
    assert_eq!(keys_of(&first), vec![cap("o+1"), cap("o+2")]);
    assert_eq!(keys_of(&second), vec![cap("o+2"), cap("o+1")]);
}

#[test]
fn references_sort_between_numbers_and_strings() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("a"), &Value::Null).unwrap();
    map.init(&cap("o+1"), &Value::Null).unwrap();
    map.init(&num(1.0), &Value::Null).unwrap();
    assert_eq!(keys_of(&map), vec![num(1.0), cap("o+1"), s("a")]);
    assert_eq!(
        keys_matching(&map, &Pattern::Eq(cap("o+1"))),
        vec![cap("o+1")]
    );
}
