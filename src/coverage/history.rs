use std::sync::Arc;

use super::part::Part;

/// An immutable snapshot of a draft Part list.
pub type Snapshot = Arc<[Part]>;

/// Append-only undo/redo log of draft snapshots.
///
/// `record` is called with the state *before* a change. `undo` and `redo`
/// exchange the current state for a stored one; neither touches the store
/// itself.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    limit: usize,
}

impl History {
    /// Creates a log retaining at most `limit` undo steps.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit,
        }
    }

    /// Records the state preceding a change and drops the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        self.future.clear();
        if self.limit == 0 {
            return;
        }
        self.past.push(before);
        if self.past.len() > self.limit {
            let excess = self.past.len() - self.limit;
            self.past.drain(..excess);
        }
    }

    /// Steps back: returns the state to restore, stashing `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        self.future.push(current);
        Some(previous)
    }

    /// Steps forward: returns the state to restore, stashing `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop()?;
        self.past.push(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Forgets every step.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
