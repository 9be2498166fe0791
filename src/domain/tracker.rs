/// Completion tracker: per-level completed flags and aggregate queries.
///
/// Flags are monotonic within a session (false → true, never back).
/// `mark_complete` on an already-completed level is a no-op; an unknown
/// level id is a typed error — that indicates a probe wiring bug, not
/// an environmental condition.

use std::fmt;

use crate::domain::level::{self, Level};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TrackerError {
    UnknownLevel(u32),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::UnknownLevel(id) => write!(f, "unknown level id {id}"),
        }
    }
}

impl std::error::Error for TrackerError {}

pub struct CompletionTracker {
    levels: Vec<Level>,
}

impl CompletionTracker {
    /// Tracker over the standard five-challenge roster.
    pub fn new() -> Self {
        CompletionTracker { levels: level::roster() }
    }

    /// Tracker over an explicit roster (tests, custom challenge sets).
    pub fn with_levels(levels: Vec<Level>) -> Self {
        CompletionTracker { levels }
    }

    /// Flip the flag for `level_id` to true. Idempotent; unknown ids fail.
    pub fn mark_complete(&mut self, level_id: u32) -> Result<(), TrackerError> {
        match self.levels.iter_mut().find(|l| l.id == level_id) {
            Some(level) => {
                level.completed = true;
                Ok(())
            }
            None => Err(TrackerError::UnknownLevel(level_id)),
        }
    }

    /// Pure read; false for unknown ids.
    pub fn is_complete(&self, level_id: u32) -> bool {
        self.levels.iter().any(|l| l.id == level_id && l.completed)
    }

    /// True iff every level's flag is true.
    pub fn all_complete(&self) -> bool {
        self.levels.iter().all(|l| l.completed)
    }

    /// Count of true flags — the certificate's "secrets collected" figure.
    pub fn completed_count(&self) -> usize {
        self.levels.iter().filter(|l| l.completed).count()
    }

    pub fn total(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    /// First incomplete level in roster order, if any.
    pub fn active_level(&self) -> Option<&Level> {
        self.levels.iter().find(|l| !l.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_then_query() {
        let mut t = CompletionTracker::new();
        for id in 0..5 {
            assert!(!t.is_complete(id));
            t.mark_complete(id).unwrap();
            assert!(t.is_complete(id));
        }
        assert!(t.all_complete());
    }

    #[test]
    fn mark_is_idempotent() {
        let mut t = CompletionTracker::new();
        t.mark_complete(2).unwrap();
        t.mark_complete(2).unwrap();
        assert!(t.is_complete(2));
        assert_eq!(t.completed_count(), 1);
    }

    #[test]
    fn unknown_id_is_rejected_and_alters_nothing() {
        let mut t = CompletionTracker::new();
        t.mark_complete(1).unwrap();
        assert_eq!(t.mark_complete(99), Err(TrackerError::UnknownLevel(99)));
        assert_eq!(t.completed_count(), 1);
        assert!(t.is_complete(1));
    }

    #[test]
    fn all_complete_iff_count_equals_total() {
        let mut t = CompletionTracker::new();
        for id in 0..4 {
            t.mark_complete(id).unwrap();
            assert!(!t.all_complete());
            assert_eq!(t.completed_count(), (id + 1) as usize);
        }
        t.mark_complete(4).unwrap();
        assert!(t.all_complete());
        assert_eq!(t.completed_count(), t.total());
    }

    #[test]
    fn active_level_advances() {
        let mut t = CompletionTracker::new();
        assert_eq!(t.active_level().map(|l| l.id), Some(0));
        t.mark_complete(0).unwrap();
        assert_eq!(t.active_level().map(|l| l.id), Some(1));
        for id in 1..5 {
            t.mark_complete(id).unwrap();
        }
        assert!(t.active_level().is_none());
    }
}
