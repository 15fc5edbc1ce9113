//! End-to-end scenarios
//!
//! Small operation sequences with exact expected outcomes.

use crate::common::*;

#[test]
fn string_keys_iterate_sorted() {
    let env = TestEnv::new();
    let map = env.map_with("strings", Pattern::Kind(KeyKind::String));
    map.init(&s("b"), &Value::from(1.0)).unwrap();
    map.init(&s("a"), &Value::from(2.0)).unwrap();
    map.init(&s("c"), &Value::from(3.0)).unwrap();

    assert_eq!(keys_of(&map), vec![s("a"), s("b"), s("c")]);
}

#[test]
fn mixed_numeric_keys_iterate_by_tag_order() {
    let env = TestEnv::new();
    let numeric = Pattern::Or(vec![
        Pattern::Kind(KeyKind::Number),
        Pattern::Kind(KeyKind::BigInt),
    ]);
    let map = env.map_with("numbers", numeric);
    map.init(&num(3.5), &Value::from("x")).unwrap();
    map.init(&big(-2), &Value::from("y")).unwrap();
    map.init(&num(-2.5), &Value::from("z")).unwrap();

    assert_eq!(keys_of(&map), vec![num(-2.5), big(-2), num(3.5)]);
    let values: Vec<Value> = map.values().unwrap().collect::<Result<_>>().unwrap();
    assert_eq!(
        values,
        vec![Value::from("z"), Value::from("y"), Value::from("x")]
    );
}

#[test]
fn every_key_kind_in_one_collection() {
    let env = TestEnv::new();
    let map = env.map("everything");
    let keys = vec![
        Key::Undefined,
        Key::symbol("iterator"),
        Key::Null,
        s("text"),
        cap("o+1"),
        num(1.0),
        big(10),
        big(-10),
        num(-1.0),
        Key::Bool(false),
    ];
    for key in &keys {
        map.init(key, &Value::Null).unwrap();
    }

    let mut expected = keys;
    expected.reverse();
    assert_eq!(keys_of(&map), expected);
}

#[test]
fn facade_round_trip() {
    let db = ordcoll::Collections::ephemeral().unwrap();
    let pets = db.create_map_store("pets", None).unwrap();
    let owner = CapRef::new("o-3");
    pets.init(&s("rex"), &Value::CapRef(owner.clone())).unwrap();
    assert_eq!(pets.get(&s("rex")).unwrap(), Value::CapRef(owner.clone()));
    assert!(db.tracker().is_reachable(&owner));
    pets.clear().unwrap();
    assert!(!db.tracker().is_reachable(&owner));
}
