//! Debounce Timers
//!
//! At most one pending deadline per control; scheduling replaces any
//! prior deadline. Time is threaded explicitly by the caller, so the
//! scheduler has no ambient clock.

use std::collections::HashMap;
use std::time::Instant;

use formic_dom::NodeId;

/// Per-control debounce deadlines
#[derive(Debug, Default)]
pub struct DebounceTimers {
    pending: HashMap<NodeId, Instant>,
}

impl DebounceTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule validation of a control; replaces a pending deadline
    pub fn schedule(&mut self, control: NodeId, deadline: Instant) {
        self.pending.insert(control, deadline);
    }

    /// Drop a control's pending deadline
    pub fn cancel(&mut self, control: NodeId) {
        self.pending.remove(&control);
    }

    /// Check for any pending deadline
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Remove and return the controls whose deadline has passed, in
    /// stable (document creation) order
    pub fn take_due(&mut self, now: Instant) -> Vec<NodeId> {
        let mut due: Vec<NodeId> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(control, _)| *control)
            .collect();
        due.sort();
        for control in &due {
            self.pending.remove(control);
        }
        due
    }

    /// Time until the next deadline fires
    pub fn time_until_next(&self, now: Instant) -> Option<std::time::Duration> {
        self.pending
            .values()
            .map(|deadline| deadline.saturating_duration_since(now))
            .min()
    }
}
