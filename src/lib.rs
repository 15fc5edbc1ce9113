//! Ordcoll - ordered persistent collections over a sorted key-value store
//!
//! Ordcoll stores map and set collections as rows in a byte-ordered
//! substrate. Keys are dynamically typed scalars encoded so that byte order
//! equals key order; values may hold capability references whose
//! reachability is reported to an external tracker.
//!
//! # Quick Start
//!
//! ```ignore
//! use ordcoll::{Collections, Key, Value};
//!
//! // Everything in memory
//! let db = Collections::ephemeral()?;
//!
//! let pets = db.create_map_store("pets", None)?;
//! pets.init(&Key::from("rex"), &Value::from("dog"))?;
//! assert_eq!(pets.get(&Key::from("rex"))?, Value::from("dog"));
//! ```
//!
//! # Architecture
//!
//! - `ordcoll-core`: keys, values, patterns, errors, config and the
//!   substrate/codec/tracker traits
//! - `ordcoll-storage`: in-memory substrate, JSON value codec, reference
//!   counting tracker
//! - `ordcoll-primitives`: key codec, collections, store views, registry
//!
//! [`Collections`] wires the reference backends together. Callers with
//! their own substrate or tracker use [`CollectionRegistry::open`]
//! directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::ops::Deref;
use std::sync::Arc;

pub use ordcoll_core::{
    BigInt, CapData, CapRef, Error, Key, KeyKind, Limits, Pattern, ReachabilityTracker,
    RegistryConfig, Result, Substrate, Value, ValueCodec,
};
pub use ordcoll_primitives::{
    Collection, CollectionKind, CollectionRegistry, Entries, Keys, MapStore,
    NonIterableMapStore, NonIterableSetStore, SetStore, Values,
};
pub use ordcoll_storage::{GcEvent, MarshalCodec, MemorySubstrate, RefCountTracker};

/// Registry wired to the reference codec and reference-counting tracker
///
/// Dereferences to [`CollectionRegistry`] for every collection operation.
pub struct Collections {
    registry: CollectionRegistry,
    tracker: Arc<RefCountTracker>,
}

impl Collections {
    /// In-memory registry with default configuration
    pub fn ephemeral() -> Result<Self> {
        Self::ephemeral_with(RegistryConfig::default())
    }

    /// In-memory registry with explicit configuration
    pub fn ephemeral_with(config: RegistryConfig) -> Result<Self> {
        Self::open(Arc::new(MemorySubstrate::new()), config)
    }

    /// Registry over an existing substrate
    pub fn open(substrate: Arc<dyn Substrate>, config: RegistryConfig) -> Result<Self> {
        let tracker = Arc::new(RefCountTracker::new());
        let registry = CollectionRegistry::open(
            substrate,
            Arc::new(MarshalCodec::new()),
            tracker.clone(),
            config,
        )?;
        Ok(Collections { registry, tracker })
    }

    /// The underlying registry
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Reachability counts for every reference stored so far
    pub fn tracker(&self) -> &Arc<RefCountTracker> {
        &self.tracker
    }
}

impl Deref for Collections {
    type Target = CollectionRegistry;

    fn deref(&self) -> &CollectionRegistry {
        &self.registry
    }
}
