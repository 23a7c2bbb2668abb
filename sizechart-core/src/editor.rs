//! Inline text editing of chart text nodes.
//!
//! A text node is either on display or being edited. Double-click enters
//! editing with the current value; Enter or blur commits only when the value
//! changed, Escape discards.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::event::{Key, KeyEvent};

/// Which piece of chart text an inline edit targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum TextTarget {
    /// Table header at a column index.
    Header {
        /// Column index.
        index: usize,
    },
    /// Table body cell.
    Cell {
        /// Row index.
        row: usize,
        /// Header (column key) of the cell.
        header: String,
    },
    /// Title line of the notes block.
    NoteTitle,
    /// One line of the notes block.
    NoteItem {
        /// Line index.
        index: usize,
    },
    /// SKU overlay label.
    Sku,
}

impl TextTarget {
    /// The manipulable element the text belongs to, if any.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Header { .. } | Self::Cell { .. } => Some(ElementId::Table),
            Self::NoteTitle | Self::NoteItem { .. } => Some(ElementId::Note),
            Self::Sku => None,
        }
    }
}

/// Editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EditorState {
    /// Showing the value.
    #[default]
    Display,
    /// An input is open.
    Editing {
        /// What is being edited.
        target: TextTarget,
        /// Value at the time editing started.
        original: String,
        /// Current contents of the input.
        buffer: String,
    },
}

/// Result of feeding the editor a key or blur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing happened; still in the same state.
    Ignored,
    /// Editing ended with a changed value that must be written back.
    Commit {
        /// What was edited.
        target: TextTarget,
        /// The new value.
        value: String,
    },
    /// Editing ended without a mutation.
    Reverted {
        /// What was being edited.
        target: TextTarget,
    },
}

/// Display/editing state machine for one inline text input.
#[derive(Debug, Clone, Default)]
pub struct InlineTextEditor {
    state: EditorState,
}

impl InlineTextEditor {
    /// Create an editor in display mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Whether an input is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    /// The target being edited and the live input contents.
    #[must_use]
    pub fn active(&self) -> Option<(&TextTarget, &str)> {
        match &self.state {
            EditorState::Editing { target, buffer, .. } => Some((target, buffer.as_str())),
            EditorState::Display => None,
        }
    }

    /// Open an input pre-filled with `current`.
    ///
    /// Returns the outcome of closing a previous edit, if one was open.
    pub fn begin(&mut self, target: TextTarget, current: &str) -> EditOutcome {
        let previous = self.blur();
        tracing::debug!(?target, "Inline edit started");
        self.state = EditorState::Editing {
            target,
            original: current.to_string(),
            buffer: current.to_string(),
        };
        previous
    }

    /// Replace the input contents.
    pub fn set_buffer(&mut self, text: &str) {
        if let EditorState::Editing { buffer, .. } = &mut self.state {
            buffer.clear();
            buffer.push_str(text);
        }
    }

    /// Handle a key press while editing.
    pub fn key(&mut self, event: &KeyEvent) -> EditOutcome {
        if !self.is_editing() {
            return EditOutcome::Ignored;
        }
        match event.key {
            Key::Enter if !event.modifiers.shift => self.blur(),
            Key::Escape => match std::mem::take(&mut self.state) {
                EditorState::Editing { target, .. } => EditOutcome::Reverted { target },
                EditorState::Display => EditOutcome::Ignored,
            },
            _ => EditOutcome::Ignored,
        }
    }

    /// Close the input, committing only if the value changed.
    pub fn blur(&mut self) -> EditOutcome {
        match std::mem::take(&mut self.state) {
            EditorState::Editing {
                target,
                original,
                buffer,
            } => {
                if buffer == original {
                    EditOutcome::Reverted { target }
                } else {
                    EditOutcome::Commit {
                        target,
                        value: buffer,
                    }
                }
            }
            EditorState::Display => EditOutcome::Ignored,
        }
    }
}
