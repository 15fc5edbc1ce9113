//! Reference backends for ordered collections
//!
//! This crate implements the interfaces the collection layer consumes:
//! - MemorySubstrate: BTreeMap-based sorted substrate with RwLock
//! - MarshalCodec: JSON value codec with slot-indexed capability references
//! - RefCountTracker: in-memory reachability counts with an event log
//! - FailingSubstrate: fault injection for substrate error paths
//!
//! Durable substrates and production GC trackers implement the same traits
//! from `ordcoll-core` and plug in without changes to the collection layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod marshal;
pub mod memory;
pub mod refcount;
pub mod testing;

pub use marshal::MarshalCodec;
pub use memory::MemorySubstrate;
pub use refcount::{GcEvent, RefCountTracker};
pub use testing::FailingSubstrate;
