//! MemorySubstrate: in-memory sorted key-value substrate
//!
//! This module implements the Substrate trait using:
//! - `BTreeMap<Vec<u8>, Vec<u8>>` for byte-ordered rows
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` counting mutations, for tests and diagnostics
//!
//! # Design Notes
//!
//! - **No durability**: contents live as long as the process. Cloning the
//!   handle shares the same rows, which is how tests simulate a restart.
//! - **Cursor by key**: `get_after` is a single ordered range lookup, so a
//!   scan that drops its cursor leaves nothing to release.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use ordcoll_core::{Result, Substrate};

/// In-memory substrate backed by an ordered map
#[derive(Debug, Clone, Default)]
pub struct MemorySubstrate {
    /// Row data, ordered by key bytes
    rows: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
    /// Count of `set` and `delete` calls
    mutations: Arc<AtomicU64>,
}

impl MemorySubstrate {
    /// Create a new empty substrate
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// True if no rows are stored
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Number of `set` and `delete` calls so far
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Copy of every row whose key starts with `prefix`, in key order
    pub fn rows_with_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let rows = self.rows.read();
        rows.range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.rows.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.rows.write().insert(key.to_vec(), value.to_vec());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.rows.write().remove(key);
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn get_after(
        &self,
        prior: &[u8],
        start: &[u8],
        end: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        let lower = if prior.is_empty() || prior < start {
            Bound::Included(start)
        } else {
            Bound::Excluded(prior)
        };
        let rows = self.rows.read();
        Ok(rows
            .range::<[u8], _>((lower, Bound::Unbounded))
            .next()
            .filter(|(k, _)| k.as_slice() < end)
            .map(|(k, v)| (k.clone(), v.clone())))
    }
}
