//! Undo/redo history over deltas.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History`, the delta-based stack used by `PlainDocument`

use std::time::Duration;

use web_time::Instant;

use crate::delta::Delta;
use crate::types::Source;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);

    /// Number of entries on the undo stack.
    fn undo_depth(&self) -> usize;
}

/// One undo step: the change and the change that reverts it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub redo: Delta,
    pub undo: Delta,
}

/// Undo/redo stacks.
///
/// User changes that arrive within `delay` of the previous recorded change
/// merge into the same entry. Non-user changes always merge into the newest
/// entry, so automatic corrections never add an undo step of their own.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_steps: usize,
    delay: Duration,
    last_recorded: Option<Instant>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(1))
    }
}

impl History {
    pub fn new(max_steps: usize, delay: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
            delay,
            last_recorded: None,
        }
    }

    /// Record `change`, applied on top of `old_contents`.
    pub fn record(&mut self, change: &Delta, old_contents: &Delta, source: Source) {
        self.record_at(change, old_contents, source, Instant::now());
    }

    pub fn record_at(
        &mut self,
        change: &Delta,
        old_contents: &Delta,
        source: Source,
        now: Instant,
    ) {
        if change.is_empty() {
            return;
        }
        let undo = change.invert(old_contents);

        let merge = match source {
            Source::User => self
                .last_recorded
                .is_some_and(|last| now.duration_since(last) < self.delay),
            Source::Api | Source::Silent => true,
        };

        if merge && let Some(prev) = self.undo_stack.pop() {
            self.undo_stack.push(HistoryEntry {
                redo: prev.redo.compose(change),
                undo: undo.compose(&prev.undo),
            });
            return;
        }
        if source != Source::User {
            // Nothing to fold into: initial content and the like.
            return;
        }

        self.redo_stack.clear();
        self.last_recorded = Some(now);
        self.undo_stack.push(HistoryEntry {
            redo: change.clone(),
            undo,
        });
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    /// Force the next user change into a fresh entry.
    pub fn cutoff(&mut self) {
        self.last_recorded = None;
    }

    /// Pop the newest entry, returning the delta that reverts it.
    pub fn take_undo(&mut self) -> Option<Delta> {
        let entry = self.undo_stack.pop()?;
        let undo = entry.undo.clone();
        self.redo_stack.push(entry);
        self.last_recorded = None;
        Some(undo)
    }

    /// Pop the newest undone entry, returning the delta that reapplies it.
    pub fn take_redo(&mut self) -> Option<Delta> {
        let entry = self.redo_stack.pop()?;
        let redo = entry.redo.clone();
        self.undo_stack.push(entry);
        self.last_recorded = None;
        Some(redo)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_recorded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Delta {
        Delta::new().insert("abc\n")
    }

    #[test]
    fn test_user_changes_outside_delay_are_separate() {
        let mut history = History::new(100, Duration::from_millis(500));
        let t0 = Instant::now();
        let c1 = Delta::new().retain(3).insert("d");
        history.record_at(&c1, &doc(), Source::User, t0);
        let after = doc().compose(&c1);
        let c2 = Delta::new().retain(4).insert("e");
        history.record_at(&c2, &after, Source::User, t0 + Duration::from_secs(2));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_user_changes_within_delay_merge() {
        let mut history = History::new(100, Duration::from_millis(500));
        let t0 = Instant::now();
        let c1 = Delta::new().retain(3).insert("d");
        history.record_at(&c1, &doc(), Source::User, t0);
        let after = doc().compose(&c1);
        let c2 = Delta::new().retain(4).insert("e");
        history.record_at(&c2, &after, Source::User, t0 + Duration::from_millis(100));
        assert_eq!(history.undo_depth(), 1);

        let undo = history.take_undo().unwrap();
        let final_doc = after.compose(&c2);
        assert_eq!(final_doc.compose(&undo), doc());
    }

    #[test]
    fn test_silent_change_folds_into_newest() {
        let mut history = History::default();
        history.cutoff();
        let c1 = Delta::new().retain(3).insert("d");
        history.record(&c1, &doc(), Source::User);
        let after = doc().compose(&c1);
        let fix = Delta::new().retain(3).delete(1).insert("D");
        history.record(&fix, &after, Source::Silent);
        assert_eq!(history.undo_depth(), 1);

        let undo = history.take_undo().unwrap();
        assert_eq!(after.compose(&fix).compose(&undo), doc());
        assert!(history.can_redo());
    }

    #[test]
    fn test_silent_change_on_empty_history_is_dropped() {
        let mut history = History::default();
        history.record(&Delta::new().insert("x"), &doc(), Source::Silent);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_max_steps() {
        let mut history = History::new(2, Duration::ZERO);
        let mut contents = doc();
        for _ in 0..4 {
            let change = Delta::new().insert("x");
            history.record(&change, &contents, Source::User);
            contents = contents.compose(&change);
        }
        assert_eq!(history.undo_depth(), 2);
    }
}
