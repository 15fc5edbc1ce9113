//! Store views over a collection
//!
//! Each view is a thin facade over a [`Collection`] that exposes the
//! operations of one store kind:
//!
//! | View | Entries | Iteration and size |
//! |------|---------|--------------------|
//! | [`MapStore`] | key to value | yes |
//! | [`SetStore`] | key only | yes |
//! | [`NonIterableMapStore`] | key to value | no |
//! | [`NonIterableSetStore`] | key only | no |
//!
//! Sets store a null value under every key. Non-iterable views omit
//! iteration and size from their surface; the underlying rows are laid out
//! exactly as for the iterable kinds.

use ordcoll_core::{Key, Pattern, Result, Value};

use crate::collection::Collection;
use crate::iter::{Entries, Keys, Values};

/// Value stored under every set member
const MEMBER: Value = Value::Null;

// =============================================================================
// MapStore
// =============================================================================

/// Iterable persistent map
#[derive(Debug, Clone)]
pub struct MapStore {
    collection: Collection,
}

impl MapStore {
    /// Wrap a collection
    pub fn new(collection: Collection) -> Self {
        MapStore { collection }
    }

    /// Underlying collection
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// True if `key` is present
    pub fn has(&self, key: &Key) -> Result<bool> {
        self.collection.has(key)
    }

    /// Value stored under `key`
    pub fn get(&self, key: &Key) -> Result<Value> {
        self.collection.get(key)
    }

    /// Add a new entry; fails if `key` is present
    pub fn init(&self, key: &Key, value: &Value) -> Result<()> {
        self.collection.init(key, value)
    }

    /// Replace an existing entry; fails if `key` is absent
    pub fn set(&self, key: &Key, value: &Value) -> Result<()> {
        self.collection.set(key, value)
    }

    /// Remove an entry; fails if `key` is absent
    pub fn delete(&self, key: &Key) -> Result<()> {
        self.collection.delete(key)
    }

    /// Keys in order
    pub fn keys(&self) -> Result<Keys> {
        self.collection.keys()
    }

    /// Keys matching `key_pattern`
    pub fn keys_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Keys> {
        self.collection.keys_matching(key_pattern, value_pattern)
    }

    /// Values in key order
    pub fn values(&self) -> Result<Values> {
        self.collection.values()
    }

    /// Values of entries whose key matches `key_pattern`
    pub fn values_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Values> {
        self.collection.values_matching(key_pattern, value_pattern)
    }

    /// Entries in key order
    pub fn entries(&self) -> Result<Entries> {
        self.collection.entries()
    }

    /// Entries whose key matches `key_pattern`
    pub fn entries_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Entries> {
        self.collection.entries_matching(key_pattern, value_pattern)
    }

    /// Number of entries
    pub fn size(&self) -> u64 {
        self.collection.size()
    }

    /// Number of entries matching the patterns
    pub fn get_size(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<u64> {
        self.collection.get_size(key_pattern, value_pattern)
    }

    /// Delete every entry
    pub fn clear(&self) -> Result<()> {
        self.collection.clear()
    }

    /// Delete every entry whose key matches `key_pattern`
    pub fn clear_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<()> {
        self.collection.clear_matching(key_pattern, value_pattern)
    }

    /// Every entry, in key order
    pub fn snapshot(&self) -> Result<Vec<(Key, Value)>> {
        self.collection.snapshot()
    }

    /// Add every pair, stopping at the first failure
    pub fn add_all<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        entries
            .into_iter()
            .try_for_each(|(key, value)| self.collection.init(&key, &value))
    }
}

// =============================================================================
// SetStore
// =============================================================================

/// Iterable persistent set
#[derive(Debug, Clone)]
pub struct SetStore {
    collection: Collection,
}

impl SetStore {
    /// Wrap a collection
    pub fn new(collection: Collection) -> Self {
        SetStore { collection }
    }

    /// Underlying collection
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// True if `key` is a member
    pub fn has(&self, key: &Key) -> Result<bool> {
        self.collection.has(key)
    }

    /// Add a member; adding a present member does nothing
    pub fn add(&self, key: &Key) -> Result<()> {
        if !self.collection.has(key)? {
            self.collection.init(key, &MEMBER)?;
        }
        Ok(())
    }

    /// Add every key, stopping at the first failure
    pub fn add_all<I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = Key>,
    {
        keys.into_iter().try_for_each(|key| self.add(&key))
    }

    /// Remove a member; fails if `key` is absent
    pub fn delete(&self, key: &Key) -> Result<()> {
        self.collection.delete(key)
    }

    /// Members in order
    pub fn keys(&self) -> Result<Keys> {
        self.collection.keys()
    }

    /// Members matching `key_pattern`
    pub fn keys_matching(&self, key_pattern: &Pattern) -> Result<Keys> {
        self.collection.keys_matching(key_pattern, &Pattern::Any)
    }

    /// Members in order; the same sequence as [`SetStore::keys`]
    pub fn values(&self) -> Result<Keys> {
        self.keys()
    }

    /// Each member paired with itself
    pub fn entries(&self) -> Result<impl Iterator<Item = Result<(Key, Key)>>> {
        Ok(self
            .keys()?
            .map(|key| key.map(|key| (key.clone(), key))))
    }

    /// Number of members
    pub fn size(&self) -> u64 {
        self.collection.size()
    }

    /// Number of members matching `key_pattern`
    pub fn get_size(&self, key_pattern: &Pattern) -> Result<u64> {
        self.collection.get_size(key_pattern, &Pattern::Any)
    }

    /// Remove every member
    pub fn clear(&self) -> Result<()> {
        self.collection.clear()
    }

    /// Remove every member matching `key_pattern`
    pub fn clear_matching(&self, key_pattern: &Pattern) -> Result<()> {
        self.collection.clear_matching(key_pattern, &Pattern::Any)
    }

    /// Every member, in order
    pub fn snapshot(&self) -> Result<Vec<Key>> {
        self.keys()?.collect()
    }
}

// =============================================================================
// Non-iterable views
// =============================================================================

/// Persistent map without iteration or size
#[derive(Debug, Clone)]
pub struct NonIterableMapStore {
    collection: Collection,
}

impl NonIterableMapStore {
    /// Wrap a collection
    pub fn new(collection: Collection) -> Self {
        NonIterableMapStore { collection }
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// True if `key` is present
    pub fn has(&self, key: &Key) -> Result<bool> {
        self.collection.has(key)
    }

    /// Value stored under `key`
    pub fn get(&self, key: &Key) -> Result<Value> {
        self.collection.get(key)
    }

    /// Add a new entry; fails if `key` is present
    pub fn init(&self, key: &Key, value: &Value) -> Result<()> {
        self.collection.init(key, value)
    }

    /// Replace an existing entry; fails if `key` is absent
    pub fn set(&self, key: &Key, value: &Value) -> Result<()> {
        self.collection.set(key, value)
    }

    /// Remove an entry; fails if `key` is absent
    pub fn delete(&self, key: &Key) -> Result<()> {
        self.collection.delete(key)
    }

    /// Delete every entry
    pub fn clear(&self) -> Result<()> {
        self.collection.clear()
    }
}

/// Persistent set without iteration or size
#[derive(Debug, Clone)]
pub struct NonIterableSetStore {
    collection: Collection,
}

impl NonIterableSetStore {
    /// Wrap a collection
    pub fn new(collection: Collection) -> Self {
        NonIterableSetStore { collection }
    }

    /// Store name
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// True if `key` is a member
    pub fn has(&self, key: &Key) -> Result<bool> {
        self.collection.has(key)
    }

    /// Add a member; adding a present member does nothing
    pub fn add(&self, key: &Key) -> Result<()> {
        if !self.collection.has(key)? {
            self.collection.init(key, &MEMBER)?;
        }
        Ok(())
    }

    /// Add every key, stopping at the first failure
    pub fn add_all<I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = Key>,
    {
        keys.into_iter().try_for_each(|key| self.add(&key))
    }

    /// Remove a member; fails if `key` is absent
    pub fn delete(&self, key: &Key) -> Result<()> {
        self.collection.delete(key)
    }

    /// Remove every member
    pub fn clear(&self) -> Result<()> {
        self.collection.clear()
    }
}
