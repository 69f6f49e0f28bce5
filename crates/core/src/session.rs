//! Resumable per-unit session state.

use crate::Time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Durable state for one learner working through one learning unit.
///
/// Keyed externally by `(learner, unit)`; written by the telemetry channel on
/// autosave and navigation, read once on re-entry to resume. Last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Index of the sub-unit the learner is currently on
    pub position: usize,

    /// Ids of completed sub-units
    pub completed: BTreeSet<String>,

    /// When the unit was first entered
    pub started_at: Time,

    /// When the unit was last touched
    pub last_accessed_at: Time,
}

impl SessionState {
    /// Fresh state for a first entry.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            position: 0,
            completed: BTreeSet::new(),
            started_at: now,
            last_accessed_at: now,
        }
    }

    /// Record navigation to a sub-unit.
    pub fn visit(&mut self, position: usize) {
        self.position = position;
        self.last_accessed_at = chrono::Utc::now();
    }

    /// Record completion of a sub-unit.
    pub fn complete(&mut self, sub_unit: impl Into<String>) {
        self.completed.insert(sub_unit.into());
        self.last_accessed_at = chrono::Utc::now();
    }

    /// Percent of sub-units completed, given the unit's total.
    pub fn percent_complete(&self, total_sub_units: usize) -> f64 {
        if total_sub_units == 0 {
            return 0.0;
        }
        (self.completed.len() as f64 / total_sub_units as f64) * 100.0
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_updates_position_and_access_time() {
        let mut state = SessionState::new();
        let before = state.last_accessed_at;
        state.visit(3);
        assert_eq!(state.position, 3);
        assert!(state.last_accessed_at >= before);
    }

    #[test]
    fn complete_is_idempotent() {
        let mut state = SessionState::new();
        state.complete("intro");
        state.complete("intro");
        assert_eq!(state.completed.len(), 1);
    }

    #[test]
    fn percent_complete_handles_empty_unit() {
        let state = SessionState::new();
        assert_eq!(state.percent_complete(0), 0.0);
    }

    #[test]
    fn percent_complete_scales() {
        let mut state = SessionState::new();
        state.complete("a");
        state.complete("b");
        assert!((state.percent_complete(4) - 50.0).abs() < f64::EPSILON);
    }
}
