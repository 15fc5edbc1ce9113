//! Fault injection for substrate error paths
//!
//! [`FailingSubstrate`] wraps a [`MemorySubstrate`] and rejects every write
//! or delete whose row key contains a chosen marker, returning
//! `Error::Storage`. Reads always succeed, so a test can inspect exactly
//! what a failed operation left behind.
//!
//! # Example
//!
//! ```ignore
//! let store = FailingSubstrate::new();
//! store.fail_on(b"|entryCount");
//! // operations touching the size row now fail
//! store.heal();
//! ```

use parking_lot::Mutex;

use ordcoll_core::{Error, Result, Substrate};

use crate::memory::MemorySubstrate;

/// Substrate that fails writes to rows containing a marker
#[derive(Debug, Default)]
pub struct FailingSubstrate {
    inner: MemorySubstrate,
    fail_on: Mutex<Option<Vec<u8>>>,
}

impl FailingSubstrate {
    /// Create an empty substrate that accepts every write
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes and deletes of rows whose key contains `marker`
    pub fn fail_on(&self, marker: &[u8]) {
        *self.fail_on.lock() = Some(marker.to_vec());
    }

    /// Accept every write again
    pub fn heal(&self) {
        *self.fail_on.lock() = None;
    }

    /// Rows stored so far
    pub fn rows(&self) -> &MemorySubstrate {
        &self.inner
    }

    fn check(&self, key: &[u8]) -> Result<()> {
        match self.fail_on.lock().as_deref() {
            Some(marker) if key.windows(marker.len()).any(|w| w == marker) => Err(
                Error::Storage(format!("injected failure at {:?}", String::from_utf8_lossy(key))),
            ),
            _ => Ok(()),
        }
    }
}

impl Substrate for FailingSubstrate {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.check(key)?;
        self.inner.delete(key)
    }

    fn get_after(
        &self,
        prior: &[u8],
        start: &[u8],
        end: &[u8],
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        self.inner.get_after(prior, start, end)
    }
}
