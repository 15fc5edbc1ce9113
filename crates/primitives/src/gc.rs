//! Reachability notifications for stored references
//!
//! Every capability reference a collection holds, as a key or inside a
//! value, is reported to the [`ReachabilityTracker`] exactly once when it
//! becomes held and once when it stops being held. Replacing a value
//! reports only the difference between the old and new reference sets.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use ordcoll_core::{CapRef, ReachabilityTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Add,
    Drop,
    Keep,
}

/// Bridge from collection mutations to the reachability tracker
#[derive(Clone)]
pub struct GcBridge {
    tracker: Arc<dyn ReachabilityTracker>,
}

impl GcBridge {
    /// Wrap a tracker
    pub fn new(tracker: Arc<dyn ReachabilityTracker>) -> Self {
        GcBridge { tracker }
    }

    /// `cap` became held
    pub fn mark_reachable(&self, cap: &CapRef) {
        trace!(cap = %cap, "reference reachable");
        self.tracker.mark_reachable(cap);
    }

    /// `cap` is no longer held
    pub fn mark_unreachable(&self, cap: &CapRef) {
        trace!(cap = %cap, "reference unreachable");
        self.tracker.mark_unreachable(cap);
    }

    /// A stored value now holds `refs`
    pub fn add_refs(&self, refs: &[CapRef]) {
        refs.iter().for_each(|cap| self.mark_reachable(cap));
    }

    /// A stored value no longer holds `refs`
    pub fn remove_refs(&self, refs: &[CapRef]) {
        refs.iter().for_each(|cap| self.mark_unreachable(cap));
    }

    /// A stored value changed from holding `before` to holding `after`
    ///
    /// References present in both are left alone. Notifications go out in
    /// reference order.
    pub fn update_refs(&self, before: &[CapRef], after: &[CapRef]) {
        let mut changes: BTreeMap<&CapRef, Change> = BTreeMap::new();
        for cap in before {
            changes.insert(cap, Change::Drop);
        }
        for cap in after {
            let change = match changes.get(cap) {
                Some(Change::Drop) | Some(Change::Keep) => Change::Keep,
                _ => Change::Add,
            };
            changes.insert(cap, change);
        }
        for (cap, change) in changes {
            match change {
                Change::Add => self.mark_reachable(cap),
                Change::Drop => self.mark_unreachable(cap),
                Change::Keep => {}
            }
        }
    }
}

impl std::fmt::Debug for GcBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcBridge").finish_non_exhaustive()
    }
}
