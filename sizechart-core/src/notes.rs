//! The notes block rendered under the size table.

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Title plus ordered note lines. Always has at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNotes")]
pub struct NotesBlock {
    title: String,
    items: Vec<String>,
}

/// Wire form, normalised through [`NotesBlock::new`].
#[derive(Deserialize)]
struct RawNotes {
    title: String,
    #[serde(default)]
    items: Vec<String>,
}

impl From<RawNotes> for NotesBlock {
    fn from(raw: RawNotes) -> Self {
        Self::new(raw.title, raw.items)
    }
}

impl Default for NotesBlock {
    fn default() -> Self {
        Self {
            title: "Please note:".to_string(),
            items: vec![
                "1. This size chart should be used as guide.".to_string(),
                "2. Measurements shown may have a tolerance of 0.3cm - 0.5cm.".to_string(),
                "3. Suggest taking ONE SIZE LARGER for those with WIDE FEET.".to_string(),
            ],
        }
    }
}

impl NotesBlock {
    /// Build a block; an empty item list falls back to a single empty line.
    #[must_use]
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        let items = if items.is_empty() {
            vec![String::new()]
        } else {
            items
        };
        Self {
            title: title.into(),
            items,
        }
    }

    /// Heading line.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Note lines.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Replace the heading.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Append a numbered placeholder line, returning its index.
    pub fn add_item(&mut self) -> usize {
        let n = self.items.len();
        self.items.push(format!("{}. New note", n + 1));
        n
    }

    /// Replace one line.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_item(&mut self, index: usize, text: impl Into<String>) -> ChartResult<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(ChartError::NoteOutOfRange { index, len })?;
        *slot = text.into();
        Ok(())
    }

    /// Remove one line. Removing the only line is a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_item(&mut self, index: usize) -> ChartResult<bool> {
        let len = self.items.len();
        if index >= len {
            return Err(ChartError::NoteOutOfRange { index, len });
        }
        if len == 1 {
            tracing::debug!("Refusing to remove the last note line");
            return Ok(false);
        }
        self.items.remove(index);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block() {
        let notes = NotesBlock::default();
        assert_eq!(notes.title(), "Please note:");
        assert_eq!(notes.items().len(), 3);
    }

    #[test]
    fn test_add_item_numbering() {
        let mut notes = NotesBlock::default();
        let index = notes.add_item();
        assert_eq!(index, 3);
        assert_eq!(notes.items()[3], "4. New note");
    }

    #[test]
    fn test_last_item_is_kept() {
        let mut notes = NotesBlock::new("T", vec!["only".to_string()]);
        assert!(!notes.remove_item(0).expect("in range"));
        assert_eq!(notes.items(), &["only"]);
    }

    #[test]
    fn test_remove_and_set() {
        let mut notes = NotesBlock::default();
        assert!(notes.remove_item(1).expect("in range"));
        assert_eq!(notes.items().len(), 2);
        notes.set_item(0, "changed").expect("in range");
        assert_eq!(notes.items()[0], "changed");
        assert!(notes.set_item(9, "x").is_err());
        assert!(notes.remove_item(9).is_err());
    }

    #[test]
    fn test_empty_items_get_one_line() {
        let notes = NotesBlock::new("T", Vec::new());
        assert_eq!(notes.items().len(), 1);
    }

    #[test]
    fn test_deserialized_empty_items_get_one_line() {
        let notes: NotesBlock =
            serde_json::from_str(r#"{"title": "N", "items": []}"#).expect("json");
        assert_eq!(notes.title(), "N");
        assert_eq!(notes.items(), &[""]);

        let missing: NotesBlock = serde_json::from_str(r#"{"title": "N"}"#).expect("json");
        assert_eq!(missing.items().len(), 1);
    }

    #[test]
    fn test_serialized_block_reads_back() {
        let notes = NotesBlock::default();
        let json = serde_json::to_string(&notes).expect("serialize");
        let back: NotesBlock = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, notes);
    }
}
