//! GC Symmetry Tests
//!
//! For every reference, reachable minus unreachable notifications is 1
//! while any entry holds it and 0 once none does.

use crate::common::*;

fn refs(ids: &[&str]) -> Value {
    Value::List(ids.iter().map(|id| Value::CapRef(CapRef::new(*id))).collect())
}

#[test]
fn key_reference_lifecycle() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&cap("o+1"), &Value::Null).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 1);
    map.set(&cap("o+1"), &Value::from(3.0)).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 1);
    map.delete(&cap("o+1")).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 0);
}

#[test]
fn value_references_follow_replacement() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("k"), &refs(&["o+1", "o+2"])).unwrap();
    map.set(&s("k"), &refs(&["o+2", "o+3"])).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 0);
    assert_eq!(net_count(&env.tracker, "o+2"), 1);
    assert_eq!(net_count(&env.tracker, "o+3"), 1);
    map.delete(&s("k")).unwrap();
    assert!(env.tracker.live_refs().is_empty());
}

#[test]
fn repeated_reference_in_one_value_counts_once() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("k"), &refs(&["o+1", "o+1", "o+1"])).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 1);
    map.delete(&s("k")).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 0);
}

#[test]
fn reference_as_key_and_value() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&cap("o+1"), &refs(&["o+1"])).unwrap();
    map.init(&s("other"), &refs(&["o+1"])).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 3);
    map.delete(&cap("o+1")).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 1);
    map.delete(&s("other")).unwrap();
    assert_eq!(net_count(&env.tracker, "o+1"), 0);
}

#[test]
fn clear_releases_everything() {
    let env = TestEnv::new();
    let map = env.map("m");
    for i in 0..20 {
        let held = format!("o-{}", i);
        map.init(&Key::cap_ref(format!("o+{}", i)), &refs(&[held.as_str()]))
            .unwrap();
    }
    assert_eq!(env.tracker.live_refs().len(), 40);
    map.clear().unwrap();
    assert!(env.tracker.live_refs().is_empty());
    assert!(env
        .tracker
        .events()
        .iter()
        .all(|e| matches!(e, GcEvent::Reachable(_) | GcEvent::Unreachable(_))));
}

#[test]
fn identical_replacement_is_silent() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("k"), &refs(&["o+1"])).unwrap();
    let before = env.tracker.events().len();
    map.set(&s("k"), &refs(&["o+1"])).unwrap();
    assert_eq!(env.tracker.events().len(), before);
}
