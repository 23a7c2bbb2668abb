//! Linear snapshot history with a cursor.
//!
//! Holds full snapshots rather than inverse actions. The cursor always
//! points at the snapshot matching the live state; a push after an undo
//! discards the redo branch.

use std::collections::VecDeque;

/// Snapshot history for undo/redo.
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    entries: VecDeque<T>,
    cursor: usize,
    limit: Option<usize>,
}

impl<T: Clone> EditHistory<T> {
    /// Create a history holding only `initial`, with no size cap.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit: None,
        }
    }

    /// Create a history that keeps at most `limit` snapshots (minimum 1).
    #[must_use]
    pub fn with_limit(initial: T, limit: usize) -> Self {
        let mut history = Self::new(initial);
        history.limit = Some(limit.max(1));
        history
    }

    /// Record a new snapshot after the cursor, dropping any redo branch.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);

        // Limit history size
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back. Returns the snapshot now current, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. Returns the snapshot now current, or `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Whether [`undo`](Self::undo) would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    /// Cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least one snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start over from a single snapshot, keeping the size cap.
    pub fn reset(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = 0;
    }
}
