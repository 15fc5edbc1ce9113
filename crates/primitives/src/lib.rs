//! Ordered persistent collections
//!
//! Provides map and set collections stored as rows in a sorted key-value
//! substrate:
//! - **Collection**: the shared core (has/get/init/set/delete, ranges, size)
//! - **MapStore / SetStore**: iterable views
//! - **NonIterableMapStore / NonIterableSetStore**: views without iteration
//! - **CollectionRegistry**: creates and reopens collections by name
//!
//! ## Design Principle: Rows Are the State
//!
//! Every fact about a collection (entries, entry count, ordinals, key
//! pattern) lives in substrate rows. Handles cache only what they can
//! rebuild, so a registry reopened over the same substrate sees the same
//! collections.
//!
//! ## Ordering
//!
//! Keys are encoded so that byte order equals key order (see [`encoding`]).
//! Iteration is a walk over a byte range with `get_after`, filtered by the
//! key pattern.
//!
//! ```rust,ignore
//! use ordcoll_primitives::CollectionRegistry;
//! use ordcoll_core::{Key, Value};
//!
//! let registry = CollectionRegistry::open(substrate, codec, tracker, config)?;
//! let pets = registry.create_map_store("pets", None)?;
//! pets.init(&Key::from("rex"), &Value::from("dog"))?;
//! for entry in pets.entries()? {
//!     let (key, value) = entry?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod encoding;
pub mod gc;
pub mod iter;
pub mod ordinal;
pub mod registry;
mod rows;
pub mod stores;

pub use collection::{Collection, CollectionContext, CollectionKind};
pub use encoding::{decode_key, encode_key, KeyCodec};
pub use gc::GcBridge;
pub use iter::{Entries, Keys, Values};
pub use ordinal::OrdinalAllocator;
pub use registry::CollectionRegistry;
pub use stores::{MapStore, NonIterableMapStore, NonIterableSetStore, SetStore};
