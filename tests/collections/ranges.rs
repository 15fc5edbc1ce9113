//! Range Correctness Tests
//!
//! Pattern-restricted iteration yields exactly the matching entries, in
//! ascending order, whatever else the collection or substrate holds.

use crate::common::*;

fn populated(env: &TestEnv) -> MapStore {
    let map = env.map("ranges");
    for i in -5..=5 {
        map.init(&num(i as f64), &Value::from(i as f64)).unwrap();
        map.init(&big(i), &Value::from(format!("{}n", i))).unwrap();
    }
    for word in ["apple", "banana", "cherry", "date", "elder"] {
        map.init(&s(word), &Value::from(word)).unwrap();
    }
    map.init(&Key::Bool(true), &Value::Null).unwrap();
    map.init(&Key::Null, &Value::Null).unwrap();
    map
}

#[test]
fn string_subrange() {
    let env = TestEnv::new();
    let map = populated(&env);
    let found = keys_matching(&map, &Pattern::between(s("b"), s("d")));
    assert_eq!(found, vec![s("banana"), s("cherry")]);
}

#[test]
fn exclusive_bounds() {
    let env = TestEnv::new();
    let map = populated(&env);
    let pattern = Pattern::And(vec![Pattern::Gt(s("banana")), Pattern::Lt(s("elder"))]);
    assert_eq!(
        keys_matching(&map, &pattern),
        vec![s("cherry"), s("date")]
    );
}

#[test]
fn number_subrange_skips_bigints() {
    let env = TestEnv::new();
    let map = populated(&env);
    let found = entries_matching(&map, &Pattern::between(num(-1.0), num(1.0)));
    assert_eq!(
        found,
        vec![
            (num(-1.0), Value::from(-1.0)),
            (num(0.0), Value::from(0.0)),
            (num(1.0), Value::from(1.0)),
        ]
    );
}

#[test]
fn bigint_subrange_crosses_sign() {
    let env = TestEnv::new();
    let map = populated(&env);
    let found = keys_matching(&map, &Pattern::between(big(-2), big(2)));
    assert_eq!(found, vec![big(-2), big(-1), big(0), big(1), big(2)]);
}

#[test]
fn kind_filters() {
    let env = TestEnv::new();
    let map = populated(&env);
    assert_eq!(keys_matching(&map, &Pattern::Kind(KeyKind::String)).len(), 5);
    assert_eq!(keys_matching(&map, &Pattern::Kind(KeyKind::Number)).len(), 11);
    assert_eq!(keys_matching(&map, &Pattern::Kind(KeyKind::BigInt)).len(), 11);
    assert_eq!(
        keys_matching(&map, &Pattern::Kind(KeyKind::Null)),
        vec![Key::Null]
    );
    assert!(keys_matching(&map, &Pattern::Kind(KeyKind::Symbol)).is_empty());
}

#[test]
fn eq_pattern_finds_one() {
    let env = TestEnv::new();
    let map = populated(&env);
    assert_eq!(keys_matching(&map, &Pattern::Eq(s("date"))), vec![s("date")]);
    assert!(keys_matching(&map, &Pattern::Eq(s("dat"))).is_empty());
}

#[test]
fn empty_intersection_yields_nothing() {
    let env = TestEnv::new();
    let map = populated(&env);
    let pattern = Pattern::And(vec![Pattern::Gt(s("x")), Pattern::Lt(s("a"))]);
    assert!(keys_matching(&map, &pattern).is_empty());
}

#[test]
fn neighbours_do_not_leak_in() {
    let env = TestEnv::new();
    let first = env.map("first");
    let second = env.map("second");
    for word in ["a", "b", "c"] {
        first.init(&s(word), &Value::Null).unwrap();
        second.init(&s(word), &Value::Null).unwrap();
    }
    second.delete(&s("b")).unwrap();
    assert_eq!(keys_of(&first), vec![s("a"), s("b"), s("c")]);
    assert_eq!(keys_of(&second), vec![s("a"), s("c")]);
}

#[test]
fn get_size_counts_matches() {
    let env = TestEnv::new();
    let map = populated(&env);
    assert_eq!(
        map.get_size(&Pattern::Kind(KeyKind::String), &Pattern::Any)
            .unwrap(),
        5
    );
    assert_eq!(map.get_size(&Pattern::Any, &Pattern::Any).unwrap(), map.size());
}

#[test]
fn clear_matching_leaves_the_rest() {
    let env = TestEnv::new();
    let map = populated(&env);
    let before = map.size();
    map.clear_matching(&Pattern::Kind(KeyKind::BigInt), &Pattern::Any)
        .unwrap();
    assert_eq!(map.size(), before - 11);
    assert!(keys_matching(&map, &Pattern::Kind(KeyKind::BigInt)).is_empty());
    assert_eq!(keys_matching(&map, &Pattern::Kind(KeyKind::Number)).len(), 11);
}
