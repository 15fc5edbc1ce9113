//! Persistence Tests
//!
//! A registry reopened over the same substrate sees every collection,
//! entry, size and ordinal created before.

use crate::common::*;

#[test]
fn entries_survive_reopen() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&s("a"), &Value::from(1.0)).unwrap();
    map.init(&cap("o+1"), &Value::from("ref")).unwrap();

    let env2 = env.reopen();
    let map = env2.registry.get_map_store("m").unwrap().unwrap();
    assert_eq!(map.size(), 2);
    assert_eq!(map.get(&s("a")).unwrap(), Value::from(1.0));
    assert_eq!(map.get(&cap("o+1")).unwrap(), Value::from("ref"));
    assert_eq!(keys_of(&map), vec![cap("o+1"), s("a")]);
}

#[test]
fn ordinals_continue_after_reopen() {
    let env = TestEnv::new();
    let map = env.map("m");
    map.init(&cap("o+1"), &Value::Null).unwrap();
    map.init(&cap("o+2"), &Value::Null).unwrap();

    let env2 = env.reopen();
    let map = env2.registry.get_map_store("m").unwrap().unwrap();
    map.delete(&cap("o+1")).unwrap();
    map.init(&cap("o+3"), &Value::Null).unwrap();
    map.init(&cap("o+1"), &Value::Null).unwrap();
    assert_eq!(keys_of(&map), vec![cap("o+2"), cap("o+3"), cap("o+1")]);
}

#[test]
fn key_pattern_survives_reopen() {
    let env = TestEnv::new();
    env.map_with("strings", Pattern::Kind(KeyKind::String));

    let env2 = env.reopen();
    let map = env2.registry.get_map_store("strings").unwrap().unwrap();
    assert!(matches!(
        map.init(&num(1.0), &Value::Null),
        Err(Error::InvalidKeyType { .. })
    ));
}

#[test]
fn ids_are_never_reused() {
    let env = TestEnv::new();
    let a = env.map("a");
    let env2 = env.reopen();
    let b = env2.map("b");
    assert!(b.collection().id() > a.collection().id());
    assert!(matches!(
        env2.registry.create_collection("a", None),
        Err(Error::DuplicateCollectionName(_))
    ));
}

#[test]
fn names_are_listed() {
    let env = TestEnv::new();
    env.map("zebra");
    env.set("apple");
    env.registry
        .create_non_iterable_map_store("mango", None)
        .unwrap();
    let env2 = env.reopen();
    assert_eq!(
        env2.registry.collection_names().unwrap(),
        vec!["apple", "mango", "zebra"]
    );
}

#[test]
fn config_from_toml_applies_limits() {
    let config = RegistryConfig::from_toml_str(
        r#"
        [limits]
        max_key_bytes = 8
        "#,
    )
    .unwrap();
    let env = TestEnv::with_config(config);
    let map = env.map("m");
    map.init(&s("short"), &Value::Null).unwrap();
    assert!(matches!(
        map.init(&s("much too long"), &Value::Null),
        Err(Error::KeyTooLarge { actual: 14, max: 8 })
    ));
}
