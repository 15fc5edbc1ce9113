//! CollectionRegistry: named collections over one substrate
//!
//! ## Design
//!
//! The registry owns the collaborators every collection shares (substrate,
//! value codec, reachability tracker, limits) and the collection id
//! counter. Ids are allocated from an atomic counter persisted at
//! `rc.nextId`; they are never reused. Each name maps to its id through a
//! `rc.name.{name}` row, so a registry reopened over the same substrate
//! finds every collection created before.
//!
//! If creation fails after an id was taken, the rows written for it are
//! removed and the id stays spent.
//!
//! Opened collections are cached by name. Independent registries over
//! different substrates share nothing.
//!
//! ## Store Kinds
//!
//! A collection records the store kind it was created for. Typed lookups
//! (`get_map_store` and friends) fail with `CollectionKindMismatch` when
//! the recorded kind differs. The untyped [`CollectionRegistry::get_collection`]
//! returns the core regardless of kind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use ordcoll_core::{
    Error, Pattern, ReachabilityTracker, RegistryConfig, Result, Substrate, ValueCodec,
};

use crate::collection::{Collection, CollectionContext, CollectionKind};
use crate::rows::{
    collection_prefix, name_row, read_u64, write_u64, NAME_ROW_PREFIX, NEXT_ID_ROW,
};
use crate::stores::{MapStore, NonIterableMapStore, NonIterableSetStore, SetStore};

/// Registry of named collections
pub struct CollectionRegistry {
    ctx: CollectionContext,
    config: RegistryConfig,
    next_id: AtomicU64,
    /// Collections opened through this registry, by name
    open: RwLock<FxHashMap<String, Collection>>,
}

impl CollectionRegistry {
    /// Open the registry stored in `substrate`
    ///
    /// An empty substrate yields an empty registry.
    pub fn open(
        substrate: Arc<dyn Substrate>,
        values: Arc<dyn ValueCodec>,
        tracker: Arc<dyn ReachabilityTracker>,
        config: RegistryConfig,
    ) -> Result<Self> {
        let next_id = read_u64(substrate.as_ref(), NEXT_ID_ROW)?.unwrap_or(1);
        info!(next_id, "opened collection registry");
        Ok(CollectionRegistry {
            ctx: CollectionContext::new(substrate, values, tracker, config.limits.clone()),
            config,
            next_id: AtomicU64::new(next_id),
            open: RwLock::new(FxHashMap::default()),
        })
    }

    /// Configuration the registry was opened with
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========== Untyped API ==========

    /// Create a map collection
    ///
    /// `key_pattern` defaults to accepting every key.
    pub fn create_collection(&self, name: &str, key_pattern: Option<Pattern>) -> Result<Collection> {
        self.create(name, CollectionKind::Map, key_pattern)
    }

    /// Collection named `name`, if one exists
    pub fn get_collection(&self, name: &str) -> Result<Option<Collection>> {
        if let Some(collection) = self.open.read().get(name) {
            return Ok(Some(collection.clone()));
        }
        let mut open = self.open.write();
        if let Some(collection) = open.get(name) {
            return Ok(Some(collection.clone()));
        }
        let id = match read_u64(self.ctx.substrate().as_ref(), &name_row(name))? {
            Some(id) => id,
            None => return Ok(None),
        };
        let collection = Collection::open(&self.ctx, id)?;
        if collection.name() != name {
            return Err(Error::Corruption(format!(
                "name row {:?} points at collection {} labelled {:?}",
                name,
                id,
                collection.name()
            )));
        }
        open.insert(name.to_string(), collection.clone());
        Ok(Some(collection))
    }

    /// Collection named `name`; fails with `CollectionNotFound` if absent
    pub fn collection(&self, name: &str) -> Result<Collection> {
        self.get_collection(name)?
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Names of every collection, in byte order
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let substrate = self.ctx.substrate();
        let start = NAME_ROW_PREFIX.to_vec();
        let mut end = NAME_ROW_PREFIX.to_vec();
        if let Some(last) = end.last_mut() {
            *last += 1;
        }
        let mut names = Vec::new();
        let mut prior = Vec::new();
        while let Some((key, _)) = substrate.get_after(&prior, &start, &end)? {
            let name = String::from_utf8(key[NAME_ROW_PREFIX.len()..].to_vec()).map_err(|_| {
                Error::Corruption(format!(
                    "collection name row {:?} is not UTF-8",
                    String::from_utf8_lossy(&key)
                ))
            })?;
            names.push(name);
            prior = key;
        }
        Ok(names)
    }

    // ========== Typed API ==========

    /// Create an iterable map store
    pub fn create_map_store(&self, name: &str, key_pattern: Option<Pattern>) -> Result<MapStore> {
        self.create(name, CollectionKind::Map, key_pattern)
            .map(MapStore::new)
    }

    /// Create an iterable set store
    pub fn create_set_store(&self, name: &str, key_pattern: Option<Pattern>) -> Result<SetStore> {
        self.create(name, CollectionKind::Set, key_pattern)
            .map(SetStore::new)
    }

    /// Create a map store without iteration
    pub fn create_non_iterable_map_store(
        &self,
        name: &str,
        key_pattern: Option<Pattern>,
    ) -> Result<NonIterableMapStore> {
        self.create(name, CollectionKind::NonIterableMap, key_pattern)
            .map(NonIterableMapStore::new)
    }

    /// Create a set store without iteration
    pub fn create_non_iterable_set_store(
        &self,
        name: &str,
        key_pattern: Option<Pattern>,
    ) -> Result<NonIterableSetStore> {
        self.create(name, CollectionKind::NonIterableSet, key_pattern)
            .map(NonIterableSetStore::new)
    }

    /// Reopen a map store
    pub fn get_map_store(&self, name: &str) -> Result<Option<MapStore>> {
        Ok(self.get_kind(name, CollectionKind::Map)?.map(MapStore::new))
    }

    /// Reopen a set store
    pub fn get_set_store(&self, name: &str) -> Result<Option<SetStore>> {
        Ok(self.get_kind(name, CollectionKind::Set)?.map(SetStore::new))
    }

    /// Reopen a non-iterable map store
    pub fn get_non_iterable_map_store(&self, name: &str) -> Result<Option<NonIterableMapStore>> {
        Ok(self
            .get_kind(name, CollectionKind::NonIterableMap)?
            .map(NonIterableMapStore::new))
    }

    /// Reopen a non-iterable set store
    pub fn get_non_iterable_set_store(&self, name: &str) -> Result<Option<NonIterableSetStore>> {
        Ok(self
            .get_kind(name, CollectionKind::NonIterableSet)?
            .map(NonIterableSetStore::new))
    }

    // ========== Internals ==========

    fn create(
        &self,
        name: &str,
        kind: CollectionKind,
        key_pattern: Option<Pattern>,
    ) -> Result<Collection> {
        let key_pattern = key_pattern.unwrap_or_default();
        key_pattern.assert_key_pattern()?;

        let substrate = self.ctx.substrate().as_ref();
        let mut open = self.open.write();
        if open.contains_key(name) || substrate.get(&name_row(name))?.is_some() {
            return Err(Error::DuplicateCollectionName(name.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        write_u64(substrate, NEXT_ID_ROW, id + 1)?;
        let created = Collection::create(&self.ctx, id, name, kind, key_pattern)
            .and_then(|collection| write_u64(substrate, &name_row(name), id).map(|()| collection));
        let collection = match created {
            Ok(collection) => collection,
            Err(e) => {
                self.discard(id);
                return Err(e);
            }
        };
        open.insert(name.to_string(), collection.clone());

        info!(collection = name, id, kind = kind.as_str(), "registered collection");
        Ok(collection)
    }

    /// Remove the rows of a collection whose creation failed
    ///
    /// The id stays spent.
    fn discard(&self, id: u64) {
        let substrate = self.ctx.substrate();
        let start = collection_prefix(id);
        let mut end = start.clone();
        if let Some(last) = end.last_mut() {
            *last += 1;
        }
        let mut prior = Vec::new();
        loop {
            let row = match substrate.get_after(&prior, &start, &end) {
                Ok(Some((key, _))) => key,
                Ok(None) => return,
                Err(e) => {
                    warn!(id, error = %e, "failed to scan rows of abandoned collection");
                    return;
                }
            };
            if let Err(e) = substrate.delete(&row) {
                warn!(id, error = %e, "failed to remove row of abandoned collection");
            }
            prior = row;
        }
    }

    fn get_kind(&self, name: &str, expected: CollectionKind) -> Result<Option<Collection>> {
        match self.get_collection(name)? {
            Some(collection) if collection.kind() != expected => {
                debug!(
                    collection = name,
                    expected = expected.as_str(),
                    actual = collection.kind().as_str(),
                    "collection kind mismatch"
                );
                Err(Error::CollectionKindMismatch {
                    name: name.to_string(),
                    expected: expected.name(),
                    actual: collection.kind().name(),
                })
            }
            other => Ok(other),
        }
    }
}

impl std::fmt::Debug for CollectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRegistry")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("open", &self.open.read().len())
            .finish()
    }
}
