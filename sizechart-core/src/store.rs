//! Tabular data store with undo/redo and publish-to-renderer semantics.
//!
//! The store holds two views of the table:
//!
//! - the *working* copy the data grid edits, and
//! - the *published* copy the composition renderer reads.
//!
//! Cell and header edits only touch the working copy (and history).
//! Structural edits, undo/redo that moved, and [`TableStore::save`] also
//! publish.

use std::fmt;

use crate::error::ChartResult;
use crate::event::{Key, KeyEvent};
use crate::history::EditHistory;
use crate::table::{RowId, TableData};

type PublishHook = Box<dyn FnMut(&TableData) + Send>;

/// Headers and rows of the active chart, with history.
pub struct TableStore {
    working: TableData,
    published: TableData,
    history: EditHistory<TableData>,
    revision: u64,
    on_publish: Option<PublishHook>,
}

impl fmt::Debug for TableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStore")
            .field("working", &self.working)
            .field("published", &self.published)
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new(TableData::new())
    }
}

impl TableStore {
    /// Create a store holding `table`, with unbounded history.
    #[must_use]
    pub fn new(table: TableData) -> Self {
        Self {
            working: table.clone(),
            published: table.clone(),
            history: EditHistory::new(table),
            revision: 0,
            on_publish: None,
        }
    }

    /// Create a store that keeps at most `limit` history snapshots.
    #[must_use]
    pub fn with_history_limit(table: TableData, limit: usize) -> Self {
        Self {
            history: EditHistory::with_limit(table.clone(), limit),
            ..Self::new(table)
        }
    }

    /// Register a callback invoked on every publish.
    pub fn set_publish_hook(&mut self, hook: impl FnMut(&TableData) + Send + 'static) {
        self.on_publish = Some(Box::new(hook));
    }

    /// Replace the table with data loaded from outside. History restarts.
    pub fn load(&mut self, table: TableData) {
        tracing::info!(
            headers = table.headers().len(),
            rows = table.len(),
            "Table loaded"
        );
        self.history.reset(table.clone());
        self.working = table;
        self.publish();
    }

    /// The copy the data grid shows.
    #[must_use]
    pub fn working(&self) -> &TableData {
        &self.working
    }

    /// The copy the renderer shows.
    #[must_use]
    pub fn published(&self) -> &TableData {
        &self.published
    }

    /// Number of publishes so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether undo would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Rename a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the name is taken.
    pub fn rename_header(&mut self, index: usize, name: &str) -> ChartResult<()> {
        self.working.rename_header(index, name)?;
        self.record();
        Ok(())
    }

    /// Set one cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is unknown or the row is past the end.
    pub fn set_cell(&mut self, row: usize, header: &str, value: &str) -> ChartResult<()> {
        self.working.set_cell(row, header, value)?;
        self.record();
        Ok(())
    }

    /// Append a blank row.
    pub fn add_row(&mut self) -> RowId {
        let id = self.working.add_row();
        self.record_and_publish();
        id
    }

    /// Remove a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn remove_row(&mut self, index: usize) -> ChartResult<()> {
        self.working.remove_row(index)?;
        self.record_and_publish();
        Ok(())
    }

    /// Append a column.
    pub fn add_column(&mut self) -> String {
        let name = self.working.add_column();
        self.record_and_publish();
        name
    }

    /// Remove a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn remove_column(&mut self, index: usize) -> ChartResult<String> {
        let name = self.working.remove_column(index)?;
        self.record_and_publish();
        Ok(name)
    }

    /// Reorder rows by id.
    ///
    /// # Errors
    ///
    /// Returns an error if `order` is not a permutation of the rows.
    pub fn reorder_rows(&mut self, order: &[RowId]) -> ChartResult<()> {
        self.working.reorder_rows(order)?;
        self.record_and_publish();
        Ok(())
    }

    /// Drag-and-drop a row from one index to another.
    ///
    /// # Errors
    ///
    /// Returns an error if either index is out of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> ChartResult<()> {
        self.working.move_row(from, to)?;
        self.record_and_publish();
        Ok(())
    }

    /// Step back one edit. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        tracing::debug!(cursor = self.history.cursor(), "Undo");
        self.working = snapshot;
        self.publish();
        true
    }

    /// Step forward one edit. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        tracing::debug!(cursor = self.history.cursor(), "Redo");
        self.working = snapshot;
        self.publish();
        true
    }

    /// Publish the working copy as-is.
    pub fn save(&mut self) {
        self.publish();
    }

    /// Handle undo/redo keyboard shortcuts. Returns `true` if consumed.
    ///
    /// Ctrl/Cmd+Z undoes; Ctrl/Cmd+Y and Ctrl/Cmd+Shift+Z redo.
    pub fn handle_shortcut(&mut self, event: &KeyEvent) -> bool {
        if !event.is_command() {
            return false;
        }
        match event.key {
            Key::Char(c) if c.eq_ignore_ascii_case(&'z') => {
                if event.modifiers.shift {
                    self.redo();
                } else {
                    self.undo();
                }
                true
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'y') => {
                self.redo();
                true
            }
            _ => false,
        }
    }

    fn record(&mut self) {
        self.history.push(self.working.clone());
    }

    fn record_and_publish(&mut self) {
        self.record();
        self.publish();
    }

    fn publish(&mut self) {
        self.published = self.working.clone();
        self.revision += 1;
        if let Some(hook) = self.on_publish.as_mut() {
            hook(&self.published);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyModifiers;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    fn sample() -> TableData {
        let mut row = BTreeMap::new();
        row.insert("A".to_string(), "1".to_string());
        row.insert("B".to_string(), "2".to_string());
        TableData::from_parts(vec!["A".into(), "B".into()], vec![row])
    }

    #[test]
    fn test_cell_edit_does_not_publish() {
        let mut store = TableStore::new(sample());
        let revision = store.revision();
        store.set_cell(0, "A", "9").expect("set");

        assert_eq!(store.working().cell(0, "A"), Some("9"));
        assert_eq!(store.published().cell(0, "A"), Some("1"));
        assert_eq!(store.revision(), revision);
        assert!(store.can_undo());

        store.save();
        assert_eq!(store.published().cell(0, "A"), Some("9"));
    }

    #[test]
    fn test_structural_edit_publishes() {
        let mut store = TableStore::new(sample());
        store.add_row();
        assert_eq!(store.published().len(), 2);
        store.add_column();
        assert_eq!(store.published().headers().len(), 3);
    }

    #[test]
    fn test_failed_edit_leaves_history_alone() {
        let mut store = TableStore::new(sample());
        assert!(store.remove_row(7).is_err());
        assert!(store.set_cell(0, "nope", "x").is_err());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_undo_redo_publish() {
        let mut store = TableStore::new(sample());
        store.remove_column(1).expect("remove");
        assert!(store.undo());
        assert_eq!(store.published().headers(), &["A", "B"]);
        assert!(!store.undo());
        assert!(store.redo());
        assert_eq!(store.published().headers(), &["A"]);
        assert!(!store.redo());
    }

    #[test]
    fn test_load_resets_history() {
        let mut store = TableStore::new(sample());
        store.add_row();
        store.load(TableData::placeholder());
        assert!(!store.can_undo());
        assert!(!store.can_redo());
        assert_eq!(store.published().headers(), &["SIZE", "UKURAN"]);
    }

    #[test]
    fn test_shortcuts() {
        let mut store = TableStore::new(sample());
        store.add_row();

        let ctrl_z = KeyEvent::with(Key::Char('z'), KeyModifiers::CTRL);
        assert!(store.handle_shortcut(&ctrl_z));
        assert_eq!(store.working().len(), 1);

        let ctrl_shift_z = KeyEvent::with(
            Key::Char('Z'),
            KeyModifiers {
                shift: true,
                ctrl: true,
                ..KeyModifiers::default()
            },
        );
        assert!(store.handle_shortcut(&ctrl_shift_z));
        assert_eq!(store.working().len(), 2);

        store.undo();
        let cmd_y = KeyEvent::with(
            Key::Char('y'),
            KeyModifiers {
                meta: true,
                ..KeyModifiers::default()
            },
        );
        assert!(store.handle_shortcut(&cmd_y));
        assert_eq!(store.working().len(), 2);

        assert!(!store.handle_shortcut(&KeyEvent::plain(Key::Char('z'))));
    }

    #[test]
    fn test_publish_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut store = TableStore::new(sample());
        store.set_publish_hook(move |table| {
            sink.lock().expect("lock").push(table.len());
        });
        store.add_row();
        store.set_cell(0, "A", "x").expect("set");
        store.save();
        assert_eq!(*seen.lock().expect("lock"), vec![2, 2]);
    }
}
