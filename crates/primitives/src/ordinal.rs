//! Ordinal allocation for capability reference keys
//!
//! A capability reference has no order of its own, so the first time one is
//! added to a collection it is assigned the collection's next ordinal. The
//! ordinal leads its encoded key, giving references insertion-order
//! iteration and a stable position while present.
//!
//! Ordinals are per collection, start at 1 and are never reused: deleting a
//! reference drops its record, and re-adding it assigns a fresh, larger
//! ordinal.

use std::sync::Arc;

use ordcoll_core::{CapRef, Result, Substrate};

use crate::rows::{meta_key, read_u64, write_u64};

const NEXT_ORDINAL: &str = "nextOrdinal";
const ORDINAL_RECORD: &str = "ord.";

/// Per-collection ordinal allocator backed by metadata rows
#[derive(Clone)]
pub struct OrdinalAllocator {
    substrate: Arc<dyn Substrate>,
    next_key: Vec<u8>,
    record_prefix: Vec<u8>,
}

impl OrdinalAllocator {
    /// Allocator for the collection with row prefix `prefix`
    pub fn new(substrate: Arc<dyn Substrate>, prefix: &[u8]) -> Self {
        OrdinalAllocator {
            substrate,
            next_key: meta_key(prefix, NEXT_ORDINAL),
            record_prefix: meta_key(prefix, ORDINAL_RECORD),
        }
    }

    /// Reset the counter for a newly created collection
    pub fn initialize(&self) -> Result<()> {
        write_u64(self.substrate.as_ref(), &self.next_key, 1)
    }

    /// Ordinal assigned to `cap`, if it is present
    pub fn ordinal_for(&self, cap: &CapRef) -> Result<Option<u64>> {
        read_u64(self.substrate.as_ref(), &self.record_key(cap))
    }

    /// Assign the next ordinal to `cap`
    ///
    /// Callers only allocate for references not already present.
    pub fn allocate(&self, cap: &CapRef) -> Result<u64> {
        let ordinal = self.next_ordinal()?;
        write_u64(self.substrate.as_ref(), &self.next_key, ordinal + 1)?;
        write_u64(self.substrate.as_ref(), &self.record_key(cap), ordinal)?;
        Ok(ordinal)
    }

    /// Drop the record for `cap`
    pub fn release(&self, cap: &CapRef) -> Result<()> {
        self.substrate.delete(&self.record_key(cap))
    }

    /// Reinstate the record for `cap` with an ordinal it held before
    pub fn restore(&self, cap: &CapRef, ordinal: u64) -> Result<()> {
        write_u64(self.substrate.as_ref(), &self.record_key(cap), ordinal)
    }

    /// Ordinal the next allocation will return
    pub fn next_ordinal(&self) -> Result<u64> {
        Ok(read_u64(self.substrate.as_ref(), &self.next_key)?.unwrap_or(1))
    }

    fn record_key(&self, cap: &CapRef) -> Vec<u8> {
        let mut key = self.record_prefix.clone();
        key.extend_from_slice(cap.id().as_bytes());
        key
    }
}

impl std::fmt::Debug for OrdinalAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdinalAllocator")
            .field("next_key", &String::from_utf8_lossy(&self.next_key))
            .finish()
    }
}
