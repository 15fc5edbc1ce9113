//! RefCountTracker: in-memory reachability counts
//!
//! Keeps a signed count per capability reference and an ordered log of every
//! notification. A count below zero means a reference was released more
//! often than it was acquired; it is logged as a warning and kept so that
//! tests can assert on it.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::warn;

use ordcoll_core::{CapRef, ReachabilityTracker};

/// One reachability notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcEvent {
    /// `mark_reachable` was called
    Reachable(CapRef),
    /// `mark_unreachable` was called
    Unreachable(CapRef),
}

#[derive(Debug, Default)]
struct TrackerState {
    counts: FxHashMap<CapRef, i64>,
    events: Vec<GcEvent>,
}

/// Reachability tracker that counts references in memory
#[derive(Debug, Default)]
pub struct RefCountTracker {
    state: Mutex<TrackerState>,
}

impl RefCountTracker {
    /// Create a tracker with every count at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Net count (reachable minus unreachable) for `cap`
    pub fn count(&self, cap: &CapRef) -> i64 {
        self.state.lock().counts.get(cap).copied().unwrap_or(0)
    }

    /// True while `cap` has a positive count
    pub fn is_reachable(&self, cap: &CapRef) -> bool {
        self.count(cap) > 0
    }

    /// Every notification received, in order
    pub fn events(&self) -> Vec<GcEvent> {
        self.state.lock().events.clone()
    }

    /// References with a non-zero count
    pub fn live_refs(&self) -> Vec<CapRef> {
        let state = self.state.lock();
        let mut refs: Vec<CapRef> = state
            .counts
            .iter()
            .filter(|(_, n)| **n != 0)
            .map(|(cap, _)| cap.clone())
            .collect();
        refs.sort();
        refs
    }
}

impl ReachabilityTracker for RefCountTracker {
    fn mark_reachable(&self, cap: &CapRef) {
        let mut state = self.state.lock();
        *state.counts.entry(cap.clone()).or_insert(0) += 1;
        state.events.push(GcEvent::Reachable(cap.clone()));
    }

    fn mark_unreachable(&self, cap: &CapRef) {
        let mut state = self.state.lock();
        let count = state.counts.entry(cap.clone()).or_insert(0);
        *count -= 1;
        if *count < 0 {
            warn!(cap = %cap, count = *count, "reference count went negative");
        }
        state.events.push(GcEvent::Unreachable(cap.clone()));
    }
}
