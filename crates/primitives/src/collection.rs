//! Collection: the shared core behind every store view
//!
//! ## Design
//!
//! A collection is a named, typed mapping from [`Key`] to [`Value`] whose
//! entries live as rows `vc.{id}.{encoded key}` in the substrate. The
//! handle is a cheap clone of an `Arc`; every clone sees the same rows and
//! the same cached size.
//!
//! ## Row Contents
//!
//! Each entry row holds the JSON form of the value's [`CapData`]. Metadata
//! rows under `vc.{id}.|` hold the label, kind, key pattern, entry count
//! and ordinal state, so a collection can be reopened from the substrate
//! alone.
//!
//! ## Reachability
//!
//! - `init` reports a capability reference key and every reference in the
//!   value as reachable.
//! - `set` reports only the difference between old and new value refs.
//! - `delete` reports the value's refs, then the key, as unreachable.
//!
//! ## Failed Writes
//!
//! When a substrate write fails partway through `init` or `delete`, the
//! rows already written are put back, so `has`, `get` and the size read as
//! before the call. An ordinal allocated by a failed `init` stays spent.
//!
//! ## Thread Safety
//!
//! Mutations on one collection are serialized by a per-collection lock so
//! that the existence check and the write of `init`, `set` and `delete`
//! happen together. Reads go straight to the substrate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use ordcoll_core::{
    CapData, Error, Key, Limits, Pattern, ReachabilityTracker, Result, Substrate, Value,
    ValueCodec,
};

use crate::encoding::KeyCodec;
use crate::gc::GcBridge;
use crate::iter::{Entries, Keys, RangeIter, Values};
use crate::ordinal::OrdinalAllocator;
use crate::rows::{collection_prefix, meta_key, read_string, read_u64, write_u64};

const LABEL: &str = "label";
const KIND: &str = "kind";
const KEY_PATTERN: &str = "keyPattern";
const ENTRY_COUNT: &str = "entryCount";

// =============================================================================
// CollectionKind
// =============================================================================

/// Which store view a collection was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Iterable map
    Map,
    /// Iterable set
    Set,
    /// Map without iteration or size
    NonIterableMap,
    /// Set without iteration or size
    NonIterableSet,
}

impl CollectionKind {
    /// Human-readable name used in errors
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::Map => "map store",
            CollectionKind::Set => "set store",
            CollectionKind::NonIterableMap => "non-iterable map store",
            CollectionKind::NonIterableSet => "non-iterable set store",
        }
    }

    /// Form persisted in the collection's `kind` row
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Map => "map",
            CollectionKind::Set => "set",
            CollectionKind::NonIterableMap => "non_iterable_map",
            CollectionKind::NonIterableSet => "non_iterable_set",
        }
    }

    /// Parse the persisted form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "map" => Some(CollectionKind::Map),
            "set" => Some(CollectionKind::Set),
            "non_iterable_map" => Some(CollectionKind::NonIterableMap),
            "non_iterable_set" => Some(CollectionKind::NonIterableSet),
            _ => None,
        }
    }
}

// =============================================================================
// CollectionContext
// =============================================================================

/// Collaborators shared by every collection of a registry
#[derive(Clone)]
pub struct CollectionContext {
    substrate: Arc<dyn Substrate>,
    values: Arc<dyn ValueCodec>,
    gc: GcBridge,
    limits: Limits,
}

impl CollectionContext {
    /// Bundle a substrate, value codec and reachability tracker
    pub fn new(
        substrate: Arc<dyn Substrate>,
        values: Arc<dyn ValueCodec>,
        tracker: Arc<dyn ReachabilityTracker>,
        limits: Limits,
    ) -> Self {
        CollectionContext {
            substrate,
            values,
            gc: GcBridge::new(tracker),
            limits,
        }
    }

    /// The substrate holding every row
    pub fn substrate(&self) -> &Arc<dyn Substrate> {
        &self.substrate
    }

    /// Size limits applied to keys and values
    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

// =============================================================================
// Collection
// =============================================================================

struct CollectionInner {
    name: String,
    id: u64,
    kind: CollectionKind,
    key_pattern: Pattern,
    codec: KeyCodec,
    ordinals: OrdinalAllocator,
    ctx: CollectionContext,
    size_key: Vec<u8>,
    size: AtomicU64,
    /// Bumped by every insertion; live iterators compare against it
    generation: AtomicU64,
    mutation: Mutex<()>,
}

/// Handle to one persistent collection
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

impl Collection {
    /// Create a new, empty collection with id `id`
    ///
    /// Writes the metadata rows. The caller guarantees `id` is unused.
    pub fn create(
        ctx: &CollectionContext,
        id: u64,
        name: &str,
        kind: CollectionKind,
        key_pattern: Pattern,
    ) -> Result<Self> {
        key_pattern.assert_key_pattern()?;
        let prefix = collection_prefix(id);
        let substrate = ctx.substrate.as_ref();
        substrate.set(&meta_key(&prefix, LABEL), name.as_bytes())?;
        substrate.set(&meta_key(&prefix, KIND), kind.as_str().as_bytes())?;
        substrate.set(
            &meta_key(&prefix, KEY_PATTERN),
            &serde_json::to_vec(&key_pattern)?,
        )?;
        write_u64(substrate, &meta_key(&prefix, ENTRY_COUNT), 0)?;

        let collection = Self::assemble(ctx, id, name.to_string(), kind, key_pattern, 0);
        collection.inner.ordinals.initialize()?;
        debug!(collection = name, id, kind = kind.as_str(), "created collection");
        Ok(collection)
    }

    /// Reopen collection `id` from its metadata rows
    pub fn open(ctx: &CollectionContext, id: u64) -> Result<Self> {
        let prefix = collection_prefix(id);
        let substrate = ctx.substrate.as_ref();
        let missing = |row: &str| Error::Corruption(format!("collection {} has no {} row", id, row));

        let name = read_string(substrate, &meta_key(&prefix, LABEL))?.ok_or_else(|| missing(LABEL))?;
        let kind_text = read_string(substrate, &meta_key(&prefix, KIND))?.ok_or_else(|| missing(KIND))?;
        let kind = CollectionKind::parse(&kind_text).ok_or_else(|| {
            Error::Corruption(format!("collection {} has unknown kind {:?}", id, kind_text))
        })?;
        let pattern_row = substrate
            .get(&meta_key(&prefix, KEY_PATTERN))?
            .ok_or_else(|| missing(KEY_PATTERN))?;
        let key_pattern: Pattern = serde_json::from_slice(&pattern_row).map_err(|e| {
            Error::Corruption(format!("collection {} key pattern: {}", id, e))
        })?;
        let size = read_u64(substrate, &meta_key(&prefix, ENTRY_COUNT))?.unwrap_or(0);

        debug!(collection = %name, id, size, "opened collection");
        Ok(Self::assemble(ctx, id, name, kind, key_pattern, size))
    }

    fn assemble(
        ctx: &CollectionContext,
        id: u64,
        name: String,
        kind: CollectionKind,
        key_pattern: Pattern,
        size: u64,
    ) -> Self {
        let prefix = collection_prefix(id);
        Collection {
            inner: Arc::new(CollectionInner {
                name,
                id,
                kind,
                key_pattern,
                ordinals: OrdinalAllocator::new(ctx.substrate.clone(), &prefix),
                size_key: meta_key(&prefix, ENTRY_COUNT),
                codec: KeyCodec::new(prefix, ctx.limits.clone()),
                ctx: ctx.clone(),
                size: AtomicU64::new(size),
                generation: AtomicU64::new(0),
                mutation: Mutex::new(()),
            }),
        }
    }

    // ========== Accessors ==========

    /// Collection name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registry-assigned id
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Store view the collection was created for
    pub fn kind(&self) -> CollectionKind {
        self.inner.kind
    }

    /// Pattern every key must satisfy
    pub fn key_pattern(&self) -> &Pattern {
        &self.inner.key_pattern
    }

    /// Number of entries
    pub fn size(&self) -> u64 {
        self.inner.size.load(Ordering::Acquire)
    }

    pub(crate) fn codec(&self) -> &KeyCodec {
        &self.inner.codec
    }

    pub(crate) fn substrate(&self) -> &dyn Substrate {
        self.inner.ctx.substrate.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    // ========== Point Operations ==========

    /// True if `key` is present
    pub fn has(&self, key: &Key) -> Result<bool> {
        self.check_key(key)?;
        self.contains(key)
    }

    /// Value stored under `key`
    pub fn get(&self, key: &Key) -> Result<Value> {
        self.check_key(key)?;
        let db_key = self.encode_present(key)?;
        let raw = self
            .substrate()
            .get(&db_key)?
            .ok_or_else(|| self.not_found(key))?;
        self.decode_value(&raw)
    }

    /// Add a new entry
    ///
    /// Fails with `DuplicateKey` if `key` is already present.
    pub fn init(&self, key: &Key, value: &Value) -> Result<()> {
        self.check_key(key)?;
        let _guard = self.inner.mutation.lock();
        if self.contains(key)? {
            return Err(Error::DuplicateKey {
                collection: self.inner.name.clone(),
                key: key.clone(),
            });
        }
        let (data, row) = self.serialize(value)?;

        let db_key = match key.as_cap_ref() {
            Some(cap) => {
                // Length check first so a rejected key spends no ordinal
                self.inner.codec.encode(key, |_| Ok(0))?;
                let ordinal = self.inner.ordinals.allocate(cap)?;
                self.inner.codec.encode(key, |_| Ok(ordinal))?
            }
            None => self.encode_present(key)?,
        };
        if let Err(e) = self
            .substrate()
            .set(&db_key, &row)
            .and_then(|()| self.record_size(true))
        {
            self.undo_init(key, &db_key);
            return Err(e);
        }
        self.inner.generation.fetch_add(1, Ordering::AcqRel);

        if let Some(cap) = key.as_cap_ref() {
            self.inner.ctx.gc.mark_reachable(cap);
        }
        self.inner.ctx.gc.add_refs(&data.refs);
        trace!(collection = %self.inner.name, key = %key, "init");
        Ok(())
    }

    /// Replace the value of an existing entry
    ///
    /// Fails with `KeyNotFound` if `key` is absent.
    pub fn set(&self, key: &Key, value: &Value) -> Result<()> {
        self.check_key(key)?;
        let _guard = self.inner.mutation.lock();
        let db_key = self.encode_present(key)?;
        let before = match self.substrate().get(&db_key)? {
            Some(raw) => self.decode_row(&raw)?,
            None => return Err(self.not_found(key)),
        };
        let (after, row) = self.serialize(value)?;
        self.substrate().set(&db_key, &row)?;

        self.inner.ctx.gc.update_refs(&before.refs, &after.refs);
        trace!(collection = %self.inner.name, key = %key, "set");
        Ok(())
    }

    /// Remove an entry
    ///
    /// Fails with `KeyNotFound` if `key` is absent.
    pub fn delete(&self, key: &Key) -> Result<()> {
        self.check_key(key)?;
        let _guard = self.inner.mutation.lock();
        let db_key = self.encode_present(key)?;
        let raw = self
            .substrate()
            .get(&db_key)?
            .ok_or_else(|| self.not_found(key))?;
        let before = self.decode_row(&raw)?;
        let ordinal = match key.as_cap_ref() {
            Some(cap) => self.inner.ordinals.ordinal_for(cap)?,
            None => None,
        };

        self.substrate().delete(&db_key)?;
        if let Err(e) = self.release_and_count(key) {
            self.undo_delete(key, ordinal, &db_key, &raw);
            return Err(e);
        }

        self.inner.ctx.gc.remove_refs(&before.refs);
        if let Some(cap) = key.as_cap_ref() {
            self.inner.ctx.gc.mark_unreachable(cap);
        }
        trace!(collection = %self.inner.name, key = %key, "delete");
        Ok(())
    }

    // ========== Bulk Operations ==========

    /// Delete every entry
    pub fn clear(&self) -> Result<()> {
        self.clear_matching(&Pattern::Any, &Pattern::Any)
    }

    /// Delete every entry whose key matches `key_pattern`
    pub fn clear_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<()> {
        let mut removed = 0u64;
        for key in self.keys_matching(key_pattern, value_pattern)? {
            self.delete(&key?)?;
            removed += 1;
        }
        debug!(collection = %self.inner.name, removed, "cleared collection");
        Ok(())
    }

    /// Number of entries matching the patterns
    pub fn get_size(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<u64> {
        if key_pattern.is_any() && value_pattern.is_any() {
            return Ok(self.size());
        }
        self.keys_matching(key_pattern, value_pattern)?
            .try_fold(0, |n, key| key.map(|_| n + 1))
    }

    /// Every entry, in key order
    pub fn snapshot(&self) -> Result<Vec<(Key, Value)>> {
        self.entries()?.collect()
    }

    // ========== Iteration ==========

    /// Keys in order
    pub fn keys(&self) -> Result<Keys> {
        self.keys_matching(&Pattern::Any, &Pattern::Any)
    }

    /// Keys matching `key_pattern`, in order
    pub fn keys_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Keys> {
        RangeIter::new(self.clone(), key_pattern.clone(), value_pattern).map(Keys::new)
    }

    /// Values in key order
    pub fn values(&self) -> Result<Values> {
        self.values_matching(&Pattern::Any, &Pattern::Any)
    }

    /// Values of entries whose key matches `key_pattern`
    pub fn values_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Values> {
        RangeIter::new(self.clone(), key_pattern.clone(), value_pattern).map(Values::new)
    }

    /// Entries in key order
    pub fn entries(&self) -> Result<Entries> {
        self.entries_matching(&Pattern::Any, &Pattern::Any)
    }

    /// Entries whose key matches `key_pattern`
    pub fn entries_matching(&self, key_pattern: &Pattern, value_pattern: &Pattern) -> Result<Entries> {
        RangeIter::new(self.clone(), key_pattern.clone(), value_pattern).map(Entries::new)
    }

    // ========== Internals ==========

    fn check_key(&self, key: &Key) -> Result<()> {
        if !self.inner.key_pattern.matches(key) {
            return Err(Error::InvalidKeyType {
                collection: self.inner.name.clone(),
                key: key.clone(),
            });
        }
        Ok(())
    }

    fn contains(&self, key: &Key) -> Result<bool> {
        match key.as_cap_ref() {
            Some(cap) => Ok(self.inner.ordinals.ordinal_for(cap)?.is_some()),
            None => Ok(self.substrate().get(&self.encode_present(key)?)?.is_some()),
        }
    }

    /// Row key of a key that is already stored; a reference without an
    /// ordinal is not stored.
    fn encode_present(&self, key: &Key) -> Result<Vec<u8>> {
        self.inner.codec.encode(key, |cap| {
            self.inner
                .ordinals
                .ordinal_for(cap)?
                .ok_or_else(|| self.not_found(key))
        })
    }

    fn not_found(&self, key: &Key) -> Error {
        Error::KeyNotFound {
            collection: self.inner.name.clone(),
            key: key.clone(),
        }
    }

    fn serialize(&self, value: &Value) -> Result<(CapData, Vec<u8>)> {
        let data = self.inner.ctx.values.serialize(value)?;
        let row = serde_json::to_vec(&data)?;
        self.inner.ctx.limits.validate_value_len(row.len())?;
        Ok((data, row))
    }

    fn decode_row(&self, raw: &[u8]) -> Result<CapData> {
        serde_json::from_slice(raw).map_err(|e| {
            Error::Corruption(format!("collection {:?} row: {}", self.inner.name, e))
        })
    }

    pub(crate) fn decode_value(&self, raw: &[u8]) -> Result<Value> {
        let data = self.decode_row(raw)?;
        self.inner.ctx.values.deserialize(&data)
    }

    /// Update and persist the entry count; callers hold the mutation lock
    /// Remove what a failed `init` already wrote
    ///
    /// The spent ordinal stays spent; only its record is dropped.
    fn undo_init(&self, key: &Key, db_key: &[u8]) {
        let row = self.substrate().delete(db_key);
        let ordinal = match key.as_cap_ref() {
            Some(cap) => self.inner.ordinals.release(cap),
            None => Ok(()),
        };
        if let Err(e) = row.and(ordinal) {
            warn!(collection = %self.inner.name, key = %key, error = %e, "failed to roll back init");
        }
    }

    fn release_and_count(&self, key: &Key) -> Result<()> {
        if let Some(cap) = key.as_cap_ref() {
            self.inner.ordinals.release(cap)?;
        }
        self.record_size(false)
    }

    /// Put back the row and ordinal record a failed `delete` removed
    fn undo_delete(&self, key: &Key, ordinal: Option<u64>, db_key: &[u8], raw: &[u8]) {
        let row = self.substrate().set(db_key, raw);
        let record = match (key.as_cap_ref(), ordinal) {
            (Some(cap), Some(ordinal)) => self.inner.ordinals.restore(cap, ordinal),
            _ => Ok(()),
        };
        if let Err(e) = row.and(record) {
            warn!(collection = %self.inner.name, key = %key, error = %e, "failed to roll back delete");
        }
    }

    fn record_size(&self, added: bool) -> Result<()> {
        let current = self.inner.size.load(Ordering::Acquire);
        let next = if added {
            current + 1
        } else {
            current.saturating_sub(1)
        };
        write_u64(self.substrate(), &self.inner.size_key, next)?;
        self.inner.size.store(next, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("size", &self.size())
            .finish()
    }
}
