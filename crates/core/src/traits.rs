//! Interfaces consumed by the collection layer
//!
//! Collections sit between three external collaborators:
//! - [`Substrate`]: a flat, byte-ordered key-value store
//! - [`ValueCodec`]: turns application values into storable capdata
//! - [`ReachabilityTracker`]: counts references for garbage collection
//!
//! Implementations live outside the collection layer so that callers can
//! swap an in-memory substrate for a durable one without touching it.

use crate::error::Result;
use crate::key::CapRef;
use crate::value::{CapData, Value};

/// Sorted byte-string key-value store
///
/// Keys and values are opaque bytes. Iteration order is byte-lexicographic.
/// The substrate serializes all operations; callers do no locking of their
/// own.
///
/// Thread safety: All methods must be safe to call from multiple threads
/// (requires Send + Sync).
pub trait Substrate: Send + Sync {
    /// Read a row
    ///
    /// Returns None if the key doesn't exist.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write a row, replacing any previous value
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a row. Removing an absent row is not an error.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// First row whose key is strictly after `prior`, within `[start, end)`
    ///
    /// An empty `prior` means "no prior key". Returns None when no such row
    /// exists.
    fn get_after(
        &self,
        prior: &[u8],
        start: &[u8],
        end: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>>;
}

/// Capability-aware value serializer
pub trait ValueCodec: Send + Sync {
    /// Serialize a value, listing every capability reference it reaches
    fn serialize(&self, value: &Value) -> Result<CapData>;

    /// Reverse [`ValueCodec::serialize`]
    fn deserialize(&self, data: &CapData) -> Result<Value>;
}

/// External reference-count tracker
///
/// Receives one notification per reference gained or lost. Makes no
/// decisions on behalf of the collection layer.
pub trait ReachabilityTracker: Send + Sync {
    /// `cap` gained a reachable reference
    fn mark_reachable(&self, cap: &CapRef);

    /// `cap` lost a reachable reference
    fn mark_unreachable(&self, cap: &CapRef);
}
